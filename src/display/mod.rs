// src/display/mod.rs
//! The display: a cell engine, the glyph library it draws from, the renderer
//! that applies its plans and the host placement service, behind one owner.
//!
//! - engine: per-cell diff state machine
//! - `Display`: one render pass = diff, commit, place, erase

pub mod engine;

pub use engine::{CellEngine, ColonFollowUp, RenderPlan};

use crate::error::DisplayResult;
use crate::geometry::{Anchor, Geometry, Transform};
use crate::glyph::GlyphLibrary;
use crate::host::PlacementService;
use crate::renderer::Renderer;
use log::{debug, info};
use std::sync::Arc;

pub struct Display {
    engine: CellEngine,
    library: Arc<GlyphLibrary>,
    renderer: Renderer,
    geometry: Arc<dyn Geometry>,
    transform: Transform,
    placement: Box<dyn PlacementService>,
}

impl Display {
    pub fn new(
        library: Arc<GlyphLibrary>,
        renderer: Renderer,
        geometry: Arc<dyn Geometry>,
        anchor: Anchor,
        placement: Box<dyn PlacementService>,
    ) -> Self {
        let transform = Transform::new(anchor, geometry.as_ref());
        Self {
            engine: CellEngine::new(),
            library,
            renderer,
            geometry,
            transform,
            placement,
        }
    }

    /// What is currently on display.
    pub fn current(&self) -> String {
        self.engine.current()
    }

    pub fn anchor(&self) -> Anchor {
        self.transform.anchor()
    }

    pub fn engine(&self) -> &CellEngine {
        &self.engine
    }

    /// Runs one render pass for `text`.
    ///
    /// The engine commits its new state before anything is placed, so a
    /// placement failure does not cause the same transition to be diffed again.
    pub fn show(&mut self, text: &str) -> DisplayResult<()> {
        let plan = self
            .engine
            .render_string(text, &self.library, &self.transform)?;
        if plan.is_empty() {
            return Ok(());
        }
        self.renderer
            .apply(&plan, &self.transform, self.placement.as_mut())
    }

    /// Colon cells a blink follow-up would blank right now.
    pub fn colon_follow_up(&self) -> Option<ColonFollowUp> {
        self.engine.colon_follow_up()
    }

    pub fn suppress_colons(&mut self, follow_up: &ColonFollowUp) {
        let plan = self.engine.suppress_colons(follow_up);
        debug!("Display: blanking {} colon regions", plan.removals.len());
        self.renderer.clear(&plan, self.placement.as_mut());
    }

    /// Removes every owned structure and forgets the current contents.
    pub fn clear(&mut self) -> DisplayResult<()> {
        info!("Display: clearing '{}'", self.engine.current());
        self.engine.reset();
        self.placement.clear_owned(self.renderer.owner())
    }

    /// Clears the display and rebuilds the transform for `anchor`; the next
    /// render draws everything there.
    pub fn move_to(&mut self, anchor: Anchor) -> DisplayResult<()> {
        self.clear()?;
        self.transform = Transform::new(anchor, self.geometry.as_ref());
        info!(
            "Display: anchored at {} facing {:?}",
            anchor.location, anchor.orientation
        );
        Ok(())
    }
}
