// src/host/mod.rs

//! Narrow interfaces to the services the display borrows from its host.
//!
//! The core never places or removes structures itself, never stores anything
//! and never asks where an operator is standing; it goes through these traits.
//! `console` implements them for the standalone binary and `store` provides
//! file-backed persistence.

pub mod console;
pub mod store;

#[cfg(test)]
pub mod mock;

use crate::error::DisplayResult;
use crate::geometry::{Anchor, Region, Vec3};
use crate::glyph::{Fragment, Palette};

/// Identity that owns every structure the display places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub name: String,
}

impl Owner {
    pub fn display(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Display".to_string(),
        }
    }
}

/// Fragments placed by one atomic request, with the tables they index into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub fragments: Vec<Fragment>,
    pub palette: Palette,
}

/// Places and removes structures in the world.
pub trait PlacementService: Send {
    /// Loads `batch` translated by `offset`. Each call stands alone; nothing is
    /// deduplicated against earlier calls.
    fn place(&mut self, batch: &Batch, owner: &Owner, offset: Vec3) -> DisplayResult<()>;

    /// Removes whatever intersects `region`. Best effort.
    fn clear_region(&mut self, region: &Region) -> DisplayResult<()>;

    /// Removes everything `owner` has placed.
    fn clear_owned(&mut self, owner: &Owner) -> DisplayResult<()>;
}

/// Reports where an operator is standing and which way they face.
pub trait OperatorLocator: Send + Sync {
    fn locate(&self, operator: &str) -> DisplayResult<Anchor>;
}

/// Key/value storage for the anchor and the process identity.
pub trait Persistence: Send + Sync {
    fn anchor(&self) -> DisplayResult<Option<Anchor>>;
    fn set_anchor(&self, anchor: Anchor) -> DisplayResult<()>;
    /// Stable identity string, created on first use.
    fn identity(&self) -> DisplayResult<String>;
}
