// src/host/mock.rs

//! Recording host services for tests.

use super::{Batch, OperatorLocator, Owner, Persistence, PlacementService};
use crate::error::{DisplayError, DisplayResult};
use crate::geometry::{Anchor, Region, Vec3};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Place {
        batch: Batch,
        owner: Owner,
        offset: Vec3,
    },
    ClearRegion(Region),
    ClearOwned(Owner),
}

#[derive(Debug, Default)]
pub struct HostLog {
    pub calls: Vec<HostCall>,
    pub fail_place: bool,
}

impl HostLog {
    pub fn places(&self) -> Vec<&Batch> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Place { batch, .. } => Some(batch),
                _ => None,
            })
            .collect()
    }

    pub fn cleared_regions(&self) -> Vec<Region> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::ClearRegion(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

/// Placement service whose calls can be inspected after it has been moved
/// into a `Display`.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlacement {
    log: Arc<Mutex<HostLog>>,
}

impl RecordingPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, HostLog> {
        self.log.lock().unwrap()
    }
}

impl PlacementService for RecordingPlacement {
    fn place(&mut self, batch: &Batch, owner: &Owner, offset: Vec3) -> DisplayResult<()> {
        let mut log = self.log();
        if log.fail_place {
            return Err(DisplayError::Host("placement refused".to_string()));
        }
        log.calls.push(HostCall::Place {
            batch: batch.clone(),
            owner: owner.clone(),
            offset,
        });
        Ok(())
    }

    fn clear_region(&mut self, region: &Region) -> DisplayResult<()> {
        self.log().calls.push(HostCall::ClearRegion(*region));
        Ok(())
    }

    fn clear_owned(&mut self, owner: &Owner) -> DisplayResult<()> {
        self.log().calls.push(HostCall::ClearOwned(owner.clone()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    anchor: Mutex<Option<Anchor>>,
}

impl Persistence for MemoryStore {
    fn anchor(&self) -> DisplayResult<Option<Anchor>> {
        Ok(*self.anchor.lock().unwrap())
    }

    fn set_anchor(&self, anchor: Anchor) -> DisplayResult<()> {
        *self.anchor.lock().unwrap() = Some(anchor);
        Ok(())
    }

    fn identity(&self) -> DisplayResult<String> {
        Ok("test-identity".to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Anchor);

impl OperatorLocator for FixedLocator {
    fn locate(&self, _operator: &str) -> DisplayResult<Anchor> {
        Ok(self.0)
    }
}
