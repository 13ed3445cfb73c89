// src/glyph.rs

//! Seven-segment glyph table and the fragment library built from the digit and
//! colon structure assets.
//!
//! A glyph is drawn by copying the fragment groups of every lit segment. The
//! library is built once at startup from two structure files and is read-only
//! afterwards; every render pass only borrows it.

use crate::error::{DisplayError, DisplayResult};
use crate::geometry::Vec3;
use bitflags::bitflags;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Structure asset format version understood by `JsonStructureReader`.
pub const STRUCTURE_VERSION: u16 = 1;

/// Number of segments in a glyph.
pub const SEGMENT_COUNT: usize = 7;

bitflags! {
    /// Lit segments of a glyph. Bit `i` selects fragment group `i`.
    ///
    /// ```text
    ///    A
    ///  F   B
    ///    G
    ///  E   C
    ///    D
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Segments: u8 {
        const A = 1 << 0; // top
        const B = 1 << 1; // upper right
        const C = 1 << 2; // lower right
        const D = 1 << 3; // bottom
        const E = 1 << 4; // lower left
        const F = 1 << 5; // upper left
        const G = 1 << 6; // middle
    }
}

/// Segment mask for `c`, ignoring case.
///
/// H, K and X share a mask, as do U and W, and M and N. Several letters also
/// read the same as a digit (O/0, S/5, Z/2); a seven-segment face cannot tell
/// them apart.
pub fn segment_mask(c: char) -> DisplayResult<Segments> {
    let bits: u8 = match c.to_ascii_uppercase() {
        ' ' => 0x00,
        '0' => 0x3F,
        '1' => 0x06,
        '2' => 0x5B,
        '3' => 0x4F,
        '4' => 0x66,
        '5' => 0x6D,
        '6' => 0x7D,
        '7' => 0x07,
        '8' => 0x7F,
        '9' => 0x6F,
        'A' => 0x77,
        'B' => 0x7C,
        'C' => 0x39,
        'D' => 0x5E,
        'E' => 0x79,
        'F' => 0x71,
        'G' => 0x3D,
        'H' => 0x76,
        'I' => 0x30,
        'J' => 0x1E,
        'K' => 0x76,
        'L' => 0x38,
        'M' => 0x37,
        'N' => 0x37,
        'O' => 0x3F,
        'P' => 0x73,
        'Q' => 0x67,
        'R' => 0x50,
        'S' => 0x6D,
        'T' => 0x78,
        'U' => 0x3E,
        'V' => 0x1C,
        'W' => 0x3E,
        'X' => 0x76,
        'Y' => 0x6E,
        'Z' => 0x5B,
        _ => return Err(DisplayError::UnsupportedCharacter(c)),
    };
    Ok(Segments::from_bits_truncate(bits))
}

/// One placeable structure unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Center of the fragment.
    pub position: Vec3,
    /// Half size along each axis before `rotation` is applied.
    pub size: Vec3,
    /// Quarter turns about the vertical axis.
    #[serde(default)]
    pub rotation: u8,
    /// Index into the palette colour table.
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub material: u32,
    /// Index into the shape asset table.
    #[serde(default)]
    pub asset: u32,
    /// Index into the batch owner table; 0 means unowned.
    #[serde(default)]
    pub owner: u32,
}

impl Fragment {
    pub fn translated(&self, offset: Vec3) -> Self {
        Fragment {
            position: self.position + offset,
            ..self.clone()
        }
    }

    /// Half size after applying `rotation`.
    pub fn half_extent(&self) -> Vec3 {
        if self.rotation % 2 == 1 {
            Vec3::new(self.size.y, self.size.x, self.size.z)
        } else {
            self.size
        }
    }

    /// Lower and upper corners.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = self.half_extent().abs();
        (self.position - half, self.position + half)
    }
}

/// Colour, material and shape tables shared by every fragment in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub colors: Vec<[u8; 4]>,
    pub materials: Vec<String>,
    pub assets: Vec<String>,
}

impl Palette {
    pub fn material_index(&self, name: &str) -> Option<u32> {
        self.materials.iter().position(|m| m == name).map(|i| i as u32)
    }

    fn intern(table: &mut Vec<String>, name: &str) -> u32 {
        match table.iter().position(|n| n == name) {
            Some(i) => i as u32,
            None => {
                table.push(name.to_string());
                (table.len() - 1) as u32
            }
        }
    }
}

/// A decoded structure file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureAsset {
    pub version: u16,
    #[serde(flatten)]
    pub palette: Palette,
    pub fragments: Vec<Fragment>,
}

/// The host's structure-file reader.
pub trait StructureReader {
    fn read(&self, bytes: &[u8]) -> DisplayResult<StructureAsset>;
}

/// Reads structure files stored as JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStructureReader;

impl StructureReader for JsonStructureReader {
    fn read(&self, bytes: &[u8]) -> DisplayResult<StructureAsset> {
        #[derive(Deserialize)]
        struct Header {
            version: u16,
        }

        let header: Header =
            serde_json::from_slice(bytes).map_err(|e| DisplayError::Asset(e.to_string()))?;
        if header.version != STRUCTURE_VERSION {
            return Err(DisplayError::BadAssetVersion {
                found: header.version,
                expected: STRUCTURE_VERSION,
            });
        }
        serde_json::from_slice(bytes).map_err(|e| DisplayError::Asset(e.to_string()))
    }
}

/// Fragment templates for the seven segments and the colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphLibrary {
    segments: [Vec<Fragment>; SEGMENT_COUNT],
    colon: Vec<Fragment>,
    palette: Palette,
}

impl GlyphLibrary {
    /// Reads both structure files and builds the library.
    pub fn load(
        reader: &dyn StructureReader,
        digit_bytes: &[u8],
        colon_bytes: &[u8],
    ) -> DisplayResult<Self> {
        let digit = reader.read(digit_bytes)?;
        let colon = reader.read(colon_bytes)?;
        Self::from_assets(digit, colon)
    }

    /// Groups the digit fragments into segments by colour index and moves the
    /// colon fragments onto the digit template's material and shape tables.
    pub fn from_assets(digit: StructureAsset, colon: StructureAsset) -> DisplayResult<Self> {
        let mut palette = digit.palette;
        let mut segments: [Vec<Fragment>; SEGMENT_COUNT] = Default::default();

        for fragment in digit.fragments {
            check_index("material", fragment.material, palette.materials.len())?;
            check_index("asset", fragment.asset, palette.assets.len())?;
            match segments.get_mut(fragment.color as usize) {
                Some(group) => group.push(fragment),
                None => warn!(
                    "GlyphLibrary: digit fragment with colour {} belongs to no segment, ignored",
                    fragment.color
                ),
            }
        }

        let mut colon_fragments = Vec::with_capacity(colon.fragments.len());
        for mut fragment in colon.fragments {
            let material = colon
                .palette
                .materials
                .get(fragment.material as usize)
                .ok_or_else(|| missing("material", fragment.material))?;
            let asset = colon
                .palette
                .assets
                .get(fragment.asset as usize)
                .ok_or_else(|| missing("asset", fragment.asset))?;
            fragment.material = Palette::intern(&mut palette.materials, material);
            fragment.asset = Palette::intern(&mut palette.assets, asset);
            colon_fragments.push(fragment);
        }

        if palette.colors.is_empty() {
            palette.colors.push([255, 255, 255, 255]);
        }

        debug!(
            "GlyphLibrary: segment sizes {:?}, {} colon fragments",
            segments.iter().map(Vec::len).collect::<Vec<_>>(),
            colon_fragments.len()
        );

        Ok(Self {
            segments,
            colon: colon_fragments,
            palette,
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Fragments of every lit segment of `c`, moved by `offset` and painted `color`.
    pub fn fragments_for(&self, c: char, color: u32, offset: Vec3) -> DisplayResult<Vec<Fragment>> {
        let mask = segment_mask(c)?;
        let mut out = Vec::new();
        for (bit, group) in self.segments.iter().enumerate() {
            if mask.bits() & (1 << bit) != 0 {
                out.extend(group.iter().map(|f| paint(f, color, offset)));
            }
        }
        Ok(out)
    }

    pub fn colon_fragments(&self, color: u32, offset: Vec3) -> Vec<Fragment> {
        self.colon.iter().map(|f| paint(f, color, offset)).collect()
    }
}

fn paint(template: &Fragment, color: u32, offset: Vec3) -> Fragment {
    Fragment {
        color,
        ..template.translated(offset)
    }
}

fn check_index(table: &str, index: u32, len: usize) -> DisplayResult<()> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(missing(table, index))
    }
}

fn missing(table: &str, index: u32) -> DisplayError {
    DisplayError::Asset(format!("{} index {} out of range", table, index))
}

#[cfg(test)]
pub(crate) mod tests;
