// src/scheduler.rs

//! Drives the display: one actor thread owns the `Display` and performs every
//! render, so render passes never interleave.
//!
//! A ticker thread posts `Tick`s; marquee animations run on their own thread
//! and post `Frame`s; commands post `Clear` and `MoveTo`. While a marquee holds
//! the override flag, ticks are dropped rather than queued. The colon blink
//! follow-up is a deadline the actor keeps for itself.

use crate::calibration::AnchorSink;
use crate::clock::ClockSource;
use crate::display::{ColonFollowUp, Display};
use crate::error::{DisplayError, DisplayResult};
use crate::geometry::Anchor;
use crate::glyph::segment_mask;
use crate::marquee;

use anyhow::Context;
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Delay between drawing colons and blanking them.
pub const COLON_BLINK_DELAY: Duration = Duration::from_millis(500);

pub enum DisplayMessage {
    /// Periodic clock update. Dropped while a marquee owns the display.
    Tick,
    /// A marquee frame.
    Frame(String),
    Clear(Sender<DisplayResult<()>>),
    MoveTo(Anchor, Sender<DisplayResult<()>>),
    Shutdown,
}

/// Single-writer flag marking that a marquee owns the display.
#[derive(Debug, Clone, Default)]
pub struct OverrideFlag(Arc<AtomicBool>);

impl OverrideFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Takes the flag; `AlreadyActive` if someone else holds it.
    pub fn acquire(&self) -> DisplayResult<()> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| DisplayError::AlreadyActive)
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State owned by the actor thread.
pub struct DisplayActor {
    display: Display,
    clock: ClockSource,
    override_flag: OverrideFlag,
    pending_blink: Option<(Instant, ColonFollowUp)>,
}

impl DisplayActor {
    pub fn new(display: Display, clock: ClockSource, override_flag: OverrideFlag) -> Self {
        Self {
            display,
            clock,
            override_flag,
            pending_blink: None,
        }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn blink_deadline(&self) -> Option<Instant> {
        self.pending_blink.as_ref().map(|(at, _)| *at)
    }

    /// Handles one message. Returns `false` on shutdown.
    ///
    /// Render failures are logged here and never escape; the next tick starts
    /// over from whatever state the engine committed.
    pub fn handle(&mut self, message: DisplayMessage, now: Instant) -> bool {
        match message {
            DisplayMessage::Tick => self.on_tick(now),
            DisplayMessage::Frame(text) => {
                self.pending_blink = None;
                if let Err(e) = self.display.show(&text) {
                    error!("DisplayActor: marquee frame '{}' failed: {}", text, e);
                }
            }
            DisplayMessage::Clear(reply) => {
                self.pending_blink = None;
                let _ = reply.send(self.display.clear());
            }
            DisplayMessage::MoveTo(anchor, reply) => {
                self.pending_blink = None;
                let _ = reply.send(self.display.move_to(anchor));
            }
            DisplayMessage::Shutdown => return false,
        }
        true
    }

    /// Applies the colon blink follow-up if it is due.
    pub fn on_deadline(&mut self, now: Instant) {
        let due = matches!(&self.pending_blink, Some((at, _)) if *at <= now);
        if !due {
            return;
        }
        if let Some((_, follow_up)) = self.pending_blink.take() {
            if self.override_flag.is_set() {
                trace!("DisplayActor: marquee active, colon blink dropped");
                return;
            }
            self.display.suppress_colons(&follow_up);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.override_flag.is_set() {
            trace!("DisplayActor: marquee active, tick dropped");
            return;
        }
        let frame = self.clock.next_frame_now();
        match self.display.show(&frame.text) {
            Ok(()) => {
                self.pending_blink = if frame.blink_colons {
                    self.display
                        .colon_follow_up()
                        .map(|f| (now + COLON_BLINK_DELAY, f))
                } else {
                    None
                };
            }
            Err(e) => error!("DisplayActor: tick render of '{}' failed: {}", frame.text, e),
        }
    }

    fn run(mut self, rx: Receiver<DisplayMessage>) {
        debug!("DisplayActor: starting event loop");
        loop {
            let received = match self.blink_deadline() {
                Some(at) => rx.recv_timeout(at.saturating_duration_since(Instant::now())),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(message) => {
                    if !self.handle(message, Instant::now()) {
                        info!("DisplayActor: shutdown requested");
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("DisplayActor: channel closed, shutting down");
                    return;
                }
            }
            self.on_deadline(Instant::now());
        }
    }
}

/// Cloneable handle used by commands to reach the actor.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: Sender<DisplayMessage>,
    override_flag: OverrideFlag,
    cell_limit: usize,
}

impl SchedulerHandle {
    pub fn new(tx: Sender<DisplayMessage>, override_flag: OverrideFlag, cell_limit: usize) -> Self {
        Self {
            tx,
            override_flag,
            cell_limit,
        }
    }

    pub fn marquee_active(&self) -> bool {
        self.override_flag.is_set()
    }

    /// Starts a marquee on its own thread.
    ///
    /// Fails with `UnsupportedCharacter` before taking the display if the text
    /// cannot be drawn, and with `AlreadyActive` if a marquee is running. The
    /// override flag is held until the last frame's hold has elapsed.
    pub fn start_marquee(&self, text: &str) -> DisplayResult<JoinHandle<()>> {
        let text = text.to_ascii_uppercase();
        for c in text.chars() {
            segment_mask(c)?;
        }
        self.override_flag.acquire()?;

        let frames = marquee::script(&text, self.cell_limit);
        let tx = self.tx.clone();
        let flag = self.override_flag.clone();
        info!("Scheduler: marquee '{}' ({} frames)", text, frames.len());

        thread::Builder::new()
            .name("marquee".to_string())
            .spawn(move || {
                for frame in frames {
                    if tx.send(DisplayMessage::Frame(frame.text)).is_err() {
                        warn!("Scheduler: display gone, marquee abandoned");
                        break;
                    }
                    thread::sleep(frame.hold);
                }
                flag.release();
                debug!("Scheduler: marquee finished");
            })
            .map_err(|e| {
                self.override_flag.release();
                DisplayError::Host(format!("failed to spawn marquee thread: {}", e))
            })
    }

    pub fn clear(&self) -> DisplayResult<()> {
        self.request(DisplayMessage::Clear)
    }

    pub fn tick(&self) -> DisplayResult<()> {
        self.tx.send(DisplayMessage::Tick).map_err(|_| closed())
    }

    fn request(
        &self,
        message: impl FnOnce(Sender<DisplayResult<()>>) -> DisplayMessage,
    ) -> DisplayResult<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx.send(message(reply_tx)).map_err(|_| closed())?;
        reply_rx.recv().map_err(|_| closed())?
    }
}

impl AnchorSink for SchedulerHandle {
    fn move_to(&self, anchor: Anchor) -> DisplayResult<()> {
        self.request(|reply| DisplayMessage::MoveTo(anchor, reply))
    }
}

fn closed() -> DisplayError {
    DisplayError::Host("display actor is not running".to_string())
}

/// The running actor and ticker threads.
pub struct Scheduler {
    handle: SchedulerHandle,
    running: Arc<AtomicBool>,
    actor: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn(display: Display, clock: ClockSource, tick_interval: Duration) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let override_flag = OverrideFlag::default();
        let handle = SchedulerHandle::new(tx.clone(), override_flag.clone(), clock.cell_limit());
        let actor = DisplayActor::new(display, clock, override_flag);

        let actor = thread::Builder::new()
            .name("display".to_string())
            .spawn(move || actor.run(rx))
            .context("Failed to spawn display actor thread")?;

        let running = Arc::new(AtomicBool::new(true));
        let ticker_running = running.clone();
        let ticker = thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || {
                while ticker_running.load(Ordering::Acquire) {
                    if tx.send(DisplayMessage::Tick).is_err() {
                        break;
                    }
                    thread::sleep(tick_interval);
                }
            })
            .context("Failed to spawn ticker thread")?;

        info!("Scheduler: ticking every {:?}", tick_interval);
        Ok(Self {
            handle,
            running,
            actor: Some(actor),
            ticker: Some(ticker),
        })
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn shutdown(mut self) {
        self.running.store(false, Ordering::Release);
        let _ = self.handle.tx.send(DisplayMessage::Shutdown);
        for thread in [self.actor.take(), self.ticker.take()].into_iter().flatten() {
            if thread.join().is_err() {
                error!("Scheduler: a thread panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests;
