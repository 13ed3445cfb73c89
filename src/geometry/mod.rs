// src/geometry/mod.rs

//! Integer 3D vectors, the discrete orientations a display can face, and the
//! axis permutations that implement them.
//!
//! The display is authored in a local frame: `y` runs left to right along the
//! row of characters, `z` is up and `x` points out of the display face. The
//! `Geometry` trait stands in for the host's rotation lookup so the engine never
//! hard-codes how an orientation maps onto world axes.

pub mod region;
pub mod transform;

pub use region::{bounds_of, merge, Region};
pub use transform::Transform;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Integer vector in world or display-local units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(a: [i32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Componentwise minimum.
    pub fn min(self, other: Vec3) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Componentwise maximum.
    pub fn max(self, other: Vec3) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The direction the face of the display points, as a quarter-turn yaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Number of counter-clockwise quarter turns from `North`.
    pub fn quarter_turns(self) -> u8 {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Orientation::North),
            "east" | "e" => Ok(Orientation::East),
            "south" | "s" => Ok(Orientation::South),
            "west" | "w" => Ok(Orientation::West),
            other => Err(format!("unknown orientation '{}'", other)),
        }
    }
}

/// World position and facing the whole display is built relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub location: Vec3,
    pub orientation: Orientation,
}

/// An axis permutation with per-axis sign flips: `out[i] = sign[i] * in[perm[i]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    pub perm: [usize; 3],
    pub sign: [i32; 3],
    /// Quarter turns a rotated fragment gains about its own vertical axis.
    pub turns: u8,
}

impl AxisMap {
    pub const IDENTITY: AxisMap = AxisMap {
        perm: [0, 1, 2],
        sign: [1, 1, 1],
        turns: 0,
    };

    pub fn apply(&self, v: Vec3) -> Vec3 {
        let a = v.to_array();
        Vec3::new(
            self.sign[0] * a[self.perm[0]],
            self.sign[1] * a[self.perm[1]],
            self.sign[2] * a[self.perm[2]],
        )
    }
}

/// Host-provided rotation lookup.
pub trait Geometry: Send + Sync {
    fn axis_map(&self, orientation: Orientation) -> AxisMap;
}

/// Yaw rotations about the vertical axis in 90 degree steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterTurns;

impl Geometry for QuarterTurns {
    fn axis_map(&self, orientation: Orientation) -> AxisMap {
        let turns = orientation.quarter_turns();
        match turns {
            0 => AxisMap::IDENTITY,
            1 => AxisMap {
                perm: [1, 0, 2],
                sign: [-1, 1, 1],
                turns,
            },
            2 => AxisMap {
                perm: [0, 1, 2],
                sign: [-1, -1, 1],
                turns,
            },
            _ => AxisMap {
                perm: [1, 0, 2],
                sign: [1, -1, 1],
                turns,
            },
        }
    }
}
