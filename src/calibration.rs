// src/calibration.rs

//! Interactive anchor placement.
//!
//! `setpos` opens a pending confirmation for the operator and waits, with a
//! deadline, for that operator's `ok`. Only a confirmed request touches
//! storage or the display; a timed-out one leaves both as they were.

use crate::error::{DisplayError, DisplayResult};
use crate::geometry::{Anchor, Orientation};
use crate::host::{OperatorLocator, Persistence};

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long an operator has to confirm.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// What an operator sent with `ok`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Confirmation {
    pub text: Option<String>,
}

/// Receives the anchor once it is confirmed.
pub trait AnchorSink {
    fn move_to(&self, anchor: Anchor) -> DisplayResult<()>;
}

struct Slot {
    generation: u64,
    tx: SyncSender<Confirmation>,
}

/// Outstanding confirmation requests, at most one per operator.
#[derive(Default)]
pub struct Confirmations {
    slots: Mutex<HashMap<String, Slot>>,
    next_generation: Mutex<u64>,
}

impl Confirmations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Opens a request for `operator`, replacing any older one.
    pub fn request(self: &Arc<Self>, operator: &str) -> PendingConfirmation {
        let generation = {
            let mut next = lock(&self.next_generation);
            *next += 1;
            *next
        };
        let (tx, rx) = mpsc::sync_channel(1);
        if lock(&self.slots)
            .insert(operator.to_string(), Slot { generation, tx })
            .is_some()
        {
            debug!("Confirmations: replaced pending request for {}", operator);
        }
        PendingConfirmation {
            operator: operator.to_string(),
            generation,
            rx,
            owner: Arc::clone(self),
        }
    }

    /// Resolves the operator's request. `false` if none was pending.
    pub fn confirm(&self, operator: &str, confirmation: Confirmation) -> bool {
        match lock(&self.slots).remove(operator) {
            Some(slot) => slot.tx.try_send(confirmation).is_ok(),
            None => false,
        }
    }

    pub fn is_pending(&self, operator: &str) -> bool {
        lock(&self.slots).contains_key(operator)
    }

    fn cancel(&self, operator: &str, generation: u64) {
        let mut slots = lock(&self.slots);
        if slots.get(operator).map(|s| s.generation) == Some(generation) {
            slots.remove(operator);
        }
    }
}

/// One operator's outstanding request.
pub struct PendingConfirmation {
    operator: String,
    generation: u64,
    rx: Receiver<Confirmation>,
    owner: Arc<Confirmations>,
}

impl PendingConfirmation {
    /// Blocks until confirmed or `timeout` passes. A request replaced by a newer
    /// one ends the same way as one that timed out.
    pub fn wait(self, timeout: Duration) -> DisplayResult<Confirmation> {
        match self.rx.recv_timeout(timeout) {
            Ok(confirmation) => Ok(confirmation),
            Err(RecvTimeoutError::Timeout) => {
                self.owner.cancel(&self.operator, self.generation);
                Err(DisplayError::TimedOut)
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Confirmations: request for {} was superseded", self.operator);
                Err(DisplayError::TimedOut)
            }
        }
    }
}

/// Runs the `setpos` flow against the host services.
pub struct Calibrator {
    confirmations: Arc<Confirmations>,
    locator: Arc<dyn OperatorLocator>,
    store: Arc<dyn Persistence>,
    timeout: Duration,
}

impl Calibrator {
    pub fn new(
        locator: Arc<dyn OperatorLocator>,
        store: Arc<dyn Persistence>,
        timeout: Duration,
    ) -> Self {
        Self {
            confirmations: Confirmations::new(),
            locator,
            store,
            timeout,
        }
    }

    pub fn begin(&self, operator: &str) -> PendingConfirmation {
        info!("Calibrator: waiting for {} to confirm", operator);
        self.confirmations.request(operator)
    }

    pub fn confirm(&self, operator: &str, text: Option<String>) -> bool {
        self.confirmations.confirm(operator, Confirmation { text })
    }

    /// Waits for the confirmation, then moves the display to the operator's
    /// position and stores it. A display that cannot move stores nothing.
    ///
    /// Confirmation text naming a direction overrides the operator's facing.
    pub fn complete(
        &self,
        operator: &str,
        pending: PendingConfirmation,
        sink: &dyn AnchorSink,
    ) -> DisplayResult<Anchor> {
        let confirmation = pending.wait(self.timeout)?;
        let mut anchor = self.locator.locate(operator)?;
        if let Some(text) = confirmation.text.as_deref() {
            match text.parse::<Orientation>() {
                Ok(orientation) => anchor.orientation = orientation,
                Err(e) => warn!("Calibrator: {}; keeping {:?}", e, anchor.orientation),
            }
        }
        sink.move_to(anchor)?;
        self.store.set_anchor(anchor)?;
        info!(
            "Calibrator: display anchored at {} facing {:?}",
            anchor.location, anchor.orientation
        );
        Ok(anchor)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
