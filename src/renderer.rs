// src/renderer.rs

//! This module defines the `Renderer`.
//!
//! The `Renderer` turns a `RenderPlan` produced by the cell engine into calls on
//! a `PlacementService`. It owns nothing about what is on display; it only
//! stamps every fragment with the display's owner, material and palette,
//! rotates the batch to the anchor's orientation, places it in one request and
//! then erases the regions the plan scheduled for removal.

use crate::display::engine::RenderPlan;
use crate::error::DisplayResult;
use crate::geometry::Transform;
use crate::glyph::{Fragment, Palette};
use crate::host::{Batch, Owner, PlacementService};

use log::{debug, warn};

/// Index of the display owner in a batch's owner table (0 means unowned).
pub const OWNER_SLOT: u32 = 1;

pub struct Renderer {
    owner: Owner,
    palette: Palette,
    material: Option<u32>,
}

impl Renderer {
    /// Creates a renderer painting with `color` in palette slot 0.
    ///
    /// `material`, if given, replaces the template material on every fragment.
    pub fn new(owner: Owner, palette: &Palette, color: [u8; 4], material: Option<&str>) -> Self {
        let mut palette = palette.clone();
        match palette.colors.first_mut() {
            Some(slot) => *slot = color,
            None => palette.colors.push(color),
        }
        let material = material.map(|name| match palette.material_index(name) {
            Some(index) => index,
            None => {
                palette.materials.push(name.to_string());
                (palette.materials.len() - 1) as u32
            }
        });
        Self {
            owner,
            palette,
            material,
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Places the plan's fragments, then erases its stale regions.
    ///
    /// An empty fragment set skips placement. Removals are best effort: a
    /// region that fails to clear is logged and the rest are still attempted.
    pub fn apply(
        &self,
        plan: &RenderPlan,
        transform: &Transform,
        placement: &mut dyn PlacementService,
    ) -> DisplayResult<()> {
        if !plan.fragments.is_empty() {
            let batch = Batch {
                fragments: plan
                    .fragments
                    .iter()
                    .map(|f| self.stamp(f, transform))
                    .collect(),
                palette: self.palette.clone(),
            };
            debug!(
                "Renderer: placing {} fragments at {}",
                batch.fragments.len(),
                transform.location()
            );
            placement.place(&batch, &self.owner, transform.location())?;
        }

        self.clear(plan, placement);
        Ok(())
    }

    /// Erases the plan's removal regions only.
    pub fn clear(&self, plan: &RenderPlan, placement: &mut dyn PlacementService) {
        for region in &plan.removals {
            if let Err(e) = placement.clear_region(region) {
                warn!(
                    "Renderer: failed to clear region at {}: {}",
                    region.center, e
                );
            }
        }
    }

    fn stamp(&self, fragment: &Fragment, transform: &Transform) -> Fragment {
        let mut out = transform.rotate_fragment(fragment);
        out.owner = OWNER_SLOT;
        if let Some(material) = self.material {
            out.material = material;
        }
        out
    }
}
