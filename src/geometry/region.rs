// src/geometry/region.rs

//! Axis-aligned boxes used to remember, and later erase, what a cell occupies.

use super::Vec3;
use crate::error::{DisplayError, DisplayResult};
use crate::glyph::Fragment;
use serde::{Deserialize, Serialize};

/// Axis-aligned box as center plus non-negative half extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub center: Vec3,
    pub extent: Vec3,
}

impl Region {
    pub fn new(center: Vec3, extent: Vec3) -> Self {
        Self {
            center,
            extent: extent.abs(),
        }
    }

    /// Builds the smallest integer region containing `[lo, hi]`.
    ///
    /// Odd spans round the extent up, so the region may reach one unit past `hi`.
    pub fn from_bounds(lo: Vec3, hi: Vec3) -> Self {
        let (lo, hi) = (lo.min(hi), lo.max(hi));
        let span = hi - lo;
        let extent = Vec3::new((span.x + 1) / 2, (span.y + 1) / 2, (span.z + 1) / 2);
        Self {
            center: lo + extent,
            extent,
        }
    }

    pub fn lower(&self) -> Vec3 {
        self.center - self.extent
    }

    pub fn upper(&self) -> Vec3 {
        self.center + self.extent
    }

    /// True if `other` lies entirely inside this region (touching faces count).
    pub fn contains(&self, other: &Region) -> bool {
        let (lo, hi) = (self.lower(), self.upper());
        let (olo, ohi) = (other.lower(), other.upper());
        lo.min(olo) == lo && hi.max(ohi) == hi
    }
}

/// Bounding region of a set of fragments; `NoRegions` if the set is empty.
pub fn bounds_of(fragments: &[Fragment]) -> DisplayResult<Region> {
    let mut iter = fragments.iter().map(Fragment::bounds);
    let (mut lo, mut hi) = iter.next().ok_or(DisplayError::NoRegions)?;
    for (flo, fhi) in iter {
        lo = lo.min(flo);
        hi = hi.max(fhi);
    }
    Ok(Region::from_bounds(lo, hi))
}

/// Smallest region enclosing every input region.
///
/// Takes the componentwise minimum of the lower corners and maximum of the upper
/// corners. Fails with `NoRegions` when nothing is supplied.
pub fn merge<'a, I>(regions: I) -> DisplayResult<Region>
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut iter = regions.into_iter();
    let first = iter.next().ok_or(DisplayError::NoRegions)?;
    let (lo, hi) = iter.fold((first.lower(), first.upper()), |(lo, hi), r| {
        (lo.min(r.lower()), hi.max(r.upper()))
    });
    Ok(Region::from_bounds(lo, hi))
}
