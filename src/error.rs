// src/error.rs

//! Error kinds surfaced by the display core.
//!
//! Startup and file plumbing use `anyhow` with context; everything a caller may
//! want to match on goes through `DisplayError`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// Character outside `0-9`, `A-Z` and space.
    #[error("Unsupported character {0:?}")]
    UnsupportedCharacter(char),
    /// A merge was requested over zero regions.
    #[error("No regions to merge")]
    NoRegions,
    /// A marquee animation already owns the display.
    #[error("A marquee is already running")]
    AlreadyActive,
    /// The operator did not confirm in time.
    #[error("Timed out waiting for confirmation")]
    TimedOut,
    #[error("Structure asset version {found} is not supported (expected {expected})")]
    BadAssetVersion { found: u16, expected: u16 },
    #[error("Malformed structure asset: {0}")]
    Asset(String),
    #[error("Host service failed: {0}")]
    Host(String),
}

pub type DisplayResult<T> = Result<T, DisplayError>;
