// src/host/console.rs

//! Host services for running the display standalone: placements and removals
//! are logged instead of touching a world, and the console operator stands at
//! a configured spot.

use super::{Batch, OperatorLocator, Owner, PlacementService};
use crate::error::DisplayResult;
use crate::geometry::{Anchor, Region, Vec3};
use log::{info, trace};

#[derive(Debug, Default)]
pub struct ConsolePlacement {
    placed: usize,
    cleared: usize,
}

impl ConsolePlacement {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlacementService for ConsolePlacement {
    fn place(&mut self, batch: &Batch, owner: &Owner, offset: Vec3) -> DisplayResult<()> {
        self.placed += batch.fragments.len();
        info!(
            "Console: place {} fragments for {} at {} ({} placed so far)",
            batch.fragments.len(),
            owner.name,
            offset,
            self.placed
        );
        for fragment in &batch.fragments {
            trace!("Console:   {:?}", fragment);
        }
        Ok(())
    }

    fn clear_region(&mut self, region: &Region) -> DisplayResult<()> {
        self.cleared += 1;
        info!(
            "Console: clear region center {} extent {} ({} cleared so far)",
            region.center, region.extent, self.cleared
        );
        Ok(())
    }

    fn clear_owned(&mut self, owner: &Owner) -> DisplayResult<()> {
        info!("Console: clear everything owned by {} ({})", owner.name, owner.id);
        self.placed = 0;
        self.cleared = 0;
        Ok(())
    }
}

/// Every operator is reported at the same configured spot.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleLocator {
    anchor: Anchor,
}

impl ConsoleLocator {
    pub fn new(anchor: Anchor) -> Self {
        Self { anchor }
    }
}

impl OperatorLocator for ConsoleLocator {
    fn locate(&self, operator: &str) -> DisplayResult<Anchor> {
        trace!("Console: locating {}", operator);
        Ok(self.anchor)
    }
}
