// In src/main.rs

// Declare modules
pub mod calibration;
pub mod clock;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod host;
pub mod marquee;
pub mod renderer;
pub mod scheduler;

use crate::{
    calibration::{Calibrator, CONFIRM_TIMEOUT},
    clock::ClockSource,
    commands::{Command, CommandRouter},
    config::CONFIG,
    display::Display,
    geometry::QuarterTurns,
    glyph::{GlyphLibrary, JsonStructureReader},
    host::{
        console::{ConsoleLocator, ConsolePlacement},
        store::JsonFileStore,
        Owner, Persistence,
    },
    renderer::Renderer,
    scheduler::Scheduler,
};

// Logging
use anyhow::Context;
use log::{info, warn};
use std::io::BufRead;
use std::sync::Arc;

/// Name the console operator goes by.
const CONSOLE_OPERATOR: &str = "console";

/// Main entry point: loads the glyph assets, starts the display and reads
/// commands from stdin until EOF.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting segclock...");
    let config = CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {:#}", e))?;

    let store = Arc::new(
        JsonFileStore::open(&config.storage.path).context("Failed to open persistent store")?,
    );
    let owner = Owner::display(store.identity().context("Failed to read process identity")?);
    info!("Display owner id: {}", owner.id);

    // --- Glyph assets ---
    // Without valid glyph geometry there is nothing to draw; any failure here is fatal.
    let digit_bytes = std::fs::read(&config.assets.digit_path).with_context(|| {
        format!(
            "Failed to read digit asset {}",
            config.assets.digit_path.display()
        )
    })?;
    let colon_bytes = std::fs::read(&config.assets.colon_path).with_context(|| {
        format!(
            "Failed to read colon asset {}",
            config.assets.colon_path.display()
        )
    })?;
    let library = Arc::new(
        GlyphLibrary::load(&JsonStructureReader, &digit_bytes, &colon_bytes)
            .context("Failed to load glyph assets")?,
    );

    let anchor = match store.anchor().context("Failed to read anchor")? {
        Some(anchor) => anchor,
        None => {
            warn!("No display position stored yet; using the origin. Run 'setpos' to move it.");
            Default::default()
        }
    };

    let renderer = Renderer::new(
        owner,
        library.palette(),
        config.appearance.color,
        config.appearance.material.as_deref(),
    );
    let mut display = Display::new(
        library,
        renderer,
        Arc::new(QuarterTurns),
        anchor,
        Box::new(ConsolePlacement::new()),
    );
    // Anything left over from a previous run is ours to remove.
    display
        .clear()
        .context("Failed to clear structures from a previous run")?;

    let started = chrono::Utc::now().timestamp();
    let clock = ClockSource::new(config.clock.clone(), started);
    let scheduler = Scheduler::spawn(display, clock, config.clock.tick_interval())?;

    let calibrator = Arc::new(Calibrator::new(
        Arc::new(ConsoleLocator::new(config.console.anchor())),
        store,
        CONFIRM_TIMEOUT,
    ));
    let router = CommandRouter::new(scheduler.handle(), calibrator);

    // --- Command loop ---
    info!("Ready. Commands: setpos | marquee <text> | clear | ok [facing]");
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Some(command) => match router.dispatch(CONSOLE_OPERATOR, command) {
                Ok(reply) => info!("{}", reply),
                Err(e) => warn!("{}", e),
            },
            None => warn!("Unknown command '{}'", line.trim()),
        }
    }

    info!("stdin closed, shutting down.");
    scheduler.shutdown();
    Ok(())
}
