// src/display/engine.rs

//! The per-cell diff engine.
//!
//! Holds what is currently on display (string, world region per cell and the
//! alternation flag per cell) and, for a new target string, works out which
//! cells must be redrawn, which old regions must be erased afterwards and what
//! each redrawn cell will occupy.

use crate::error::{DisplayError, DisplayResult};
use crate::geometry::{bounds_of, merge, Region, Transform, Vec3};
use crate::glyph::{Fragment, GlyphLibrary};
use log::{debug, trace};

/// Rendered colon.
pub const COLON: char = ':';
/// Colon cell that keeps its layout slot but draws nothing.
pub const BLANK_COLON: char = ';';

/// Row advance of a digit or letter cell.
pub const DIGIT_ADVANCE: i32 = 90;
/// Row advance of a space.
pub const SPACE_ADVANCE: i32 = 90;
/// Row advance of a suppressed colon.
pub const BLANK_COLON_ADVANCE: i32 = 40;
/// A rendered colon is drawn this far back from the cursor...
pub const COLON_LEAD: i32 = -25;
/// ...and the cursor then moves on by this much, for the same net advance as a
/// suppressed colon.
pub const COLON_TRAIL: i32 = 65;
/// Sideways nudge applied to a redrawn cell while its alternation flag is set.
pub const ALTERNATE_NUDGE: i32 = -4;
/// Palette slot every glyph fragment is painted with.
pub const GLYPH_COLOR: u32 = 0;

/// Net row advance of a cell holding `c`.
pub fn advance(c: char) -> i32 {
    match c {
        COLON => COLON_LEAD + COLON_TRAIL,
        BLANK_COLON => BLANK_COLON_ADVANCE,
        ' ' => SPACE_ADVANCE,
        _ => DIGIT_ADVANCE,
    }
}

/// A cell redrawn by a render pass and the local offset its fragments used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedCell {
    pub index: usize,
    pub offset: Vec3,
}

/// Everything one render pass needs the world to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    /// New fragments in the display-local frame, from changed cells only.
    pub fragments: Vec<Fragment>,
    /// World regions to erase once the new fragments are placed.
    pub removals: Vec<Region>,
    pub placed: Vec<PlacedCell>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.removals.is_empty()
    }
}

/// Colon cells to blank half a second after they were drawn, with the region
/// each one had when the follow-up was scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColonFollowUp {
    pub cells: Vec<(usize, Option<Region>)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DisplayState {
    current: Vec<char>,
    regions: Vec<Option<Region>>,
    alternation: Vec<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CellEngine {
    state: DisplayState,
}

impl CellEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> String {
        self.state.current.iter().collect()
    }

    pub fn regions(&self) -> &[Option<Region>] {
        &self.state.regions
    }

    pub fn alternation(&self) -> &[bool] {
        &self.state.alternation
    }

    /// Forgets everything on display; the next render redraws every cell.
    pub fn reset(&mut self) {
        self.state = DisplayState::default();
    }

    /// Diffs `target` against the current contents and commits the result.
    ///
    /// Nothing is committed if any character is unsupported.
    pub fn render_string(
        &mut self,
        target: &str,
        library: &GlyphLibrary,
        transform: &Transform,
    ) -> DisplayResult<RenderPlan> {
        let target: Vec<char> = target.chars().collect();
        let mut alternation = self.state.alternation.clone();
        if alternation.len() < target.len() {
            alternation.resize(target.len(), false);
        }
        let mut regions = Vec::with_capacity(target.len());
        let mut plan = RenderPlan::default();
        let mut cursor = 0;

        for (index, &c) in target.iter().enumerate() {
            let old_region = self.state.regions.get(index).copied().flatten();
            let changed = self.state.current.get(index) != Some(&c);
            let mut nudge = 0;
            if changed {
                if let Some(region) = old_region {
                    plan.removals.push(region);
                }
                alternation[index] = !alternation[index];
                if alternation[index] {
                    nudge = ALTERNATE_NUDGE;
                }
            }

            let region = match c {
                COLON => {
                    cursor += COLON_LEAD;
                    let region = if changed {
                        let offset = Vec3::new(nudge, cursor, 0);
                        let fragments = library.colon_fragments(GLYPH_COLOR, offset);
                        place_cell(index, offset, fragments, transform, &mut plan)?
                    } else {
                        old_region
                    };
                    cursor += COLON_TRAIL;
                    region
                }
                BLANK_COLON | ' ' => {
                    cursor += advance(c);
                    None
                }
                _ => {
                    let region = if changed {
                        let offset = Vec3::new(nudge, cursor, 0);
                        let fragments = library.fragments_for(c, GLYPH_COLOR, offset)?;
                        place_cell(index, offset, fragments, transform, &mut plan)?
                    } else {
                        old_region
                    };
                    cursor += DIGIT_ADVANCE;
                    region
                }
            };
            regions.push(region);
        }

        if self.state.regions.len() > target.len() {
            let trailing = self.state.regions[target.len()..].iter().flatten();
            match merge(trailing) {
                Ok(region) => plan.removals.push(region),
                Err(DisplayError::NoRegions) => {}
                Err(e) => return Err(e),
            }
        }

        debug!(
            "CellEngine: '{}' -> '{}': {} cells redrawn, {} fragments, {} removals",
            self.current(),
            target.iter().collect::<String>(),
            plan.placed.len(),
            plan.fragments.len(),
            plan.removals.len()
        );

        self.state = DisplayState {
            current: target,
            regions,
            alternation,
        };
        Ok(plan)
    }

    /// Colon cells currently drawn, if any.
    pub fn colon_follow_up(&self) -> Option<ColonFollowUp> {
        let cells: Vec<_> = self
            .state
            .current
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == COLON)
            .map(|(i, _)| (i, self.state.regions.get(i).copied().flatten()))
            .collect();
        if cells.is_empty() {
            None
        } else {
            Some(ColonFollowUp { cells })
        }
    }

    /// Turns the follow-up's colons into suppressed colons.
    ///
    /// Cells that were redrawn since the follow-up was scheduled are left
    /// alone. The returned plan only erases; the layout does not move because
    /// both colon forms advance the row equally.
    pub fn suppress_colons(&mut self, follow_up: &ColonFollowUp) -> RenderPlan {
        let mut plan = RenderPlan::default();
        for &(index, region) in &follow_up.cells {
            let still_drawn = self.state.current.get(index) == Some(&COLON)
                && self.state.regions.get(index).copied().flatten() == region;
            if !still_drawn {
                trace!("CellEngine: colon at {} was redrawn, skipping", index);
                continue;
            }
            self.state.current[index] = BLANK_COLON;
            self.state.regions[index] = None;
            if let Some(region) = region {
                plan.removals.push(region);
            }
        }
        plan
    }
}

fn place_cell(
    index: usize,
    offset: Vec3,
    fragments: Vec<Fragment>,
    transform: &Transform,
    plan: &mut RenderPlan,
) -> DisplayResult<Option<Region>> {
    let region = match bounds_of(&fragments) {
        Ok(local) => Some(transform.region_to_world(&local)),
        Err(DisplayError::NoRegions) => None,
        Err(e) => return Err(e),
    };
    trace!(
        "CellEngine: cell {} at {} -> {} fragments, region {:?}",
        index,
        offset,
        fragments.len(),
        region
    );
    plan.fragments.extend(fragments);
    plan.placed.push(PlacedCell { index, offset });
    Ok(region)
}
