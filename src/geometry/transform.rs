// src/geometry/transform.rs

//! Maps display-local offsets, regions and fragments into world space.

use super::{Anchor, AxisMap, Geometry, Region, Vec3};
use crate::glyph::Fragment;

/// The local-to-world mapping for one anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    anchor: Anchor,
    axes: AxisMap,
}

impl Transform {
    pub fn new(anchor: Anchor, geometry: &dyn Geometry) -> Self {
        Self {
            anchor,
            axes: geometry.axis_map(anchor.orientation),
        }
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn location(&self) -> Vec3 {
        self.anchor.location
    }

    /// Rotates a local direction without translating it.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        self.axes.apply(v)
    }

    pub fn offset_to_world(&self, local: Vec3) -> Vec3 {
        self.rotate(local) + self.anchor.location
    }

    /// Rotated extents can come out negative; they are folded back to magnitudes.
    pub fn region_to_world(&self, local: &Region) -> Region {
        Region {
            center: self.offset_to_world(local.center),
            extent: self.rotate(local.extent).abs(),
        }
    }

    /// Rotates a fragment about the anchor. Translation is left to the placement
    /// call, which receives the anchor location as its batch offset.
    pub fn rotate_fragment(&self, fragment: &Fragment) -> Fragment {
        Fragment {
            position: self.rotate(fragment.position),
            rotation: (fragment.rotation + self.axes.turns) % 4,
            ..fragment.clone()
        }
    }
}
