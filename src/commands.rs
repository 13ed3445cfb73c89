// src/commands.rs

//! Operator commands: parsing a command line and routing it to the scheduler
//! or the calibrator. Permission checks belong to the host.

use crate::calibration::Calibrator;
use crate::error::{DisplayError, DisplayResult};
use crate::scheduler::SchedulerHandle;

use log::{error, info, warn};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start placing the display where the operator stands.
    SetPos,
    Marquee(String),
    Clear,
    /// Confirm a pending `setpos`, optionally naming a facing.
    Ok(Option<String>),
}

impl Command {
    /// Parses `setpos`, `marquee <text>`, `clear` or `ok [text]`. The verb is
    /// case-insensitive; everything after it is kept as typed.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let rest = (!rest.is_empty()).then(|| rest.to_string());
        match verb.to_ascii_lowercase().as_str() {
            "setpos" => Some(Command::SetPos),
            "marquee" => rest.map(Command::Marquee),
            "clear" => Some(Command::Clear),
            "ok" => Some(Command::Ok(rest)),
            _ => None,
        }
    }
}

pub struct CommandRouter {
    scheduler: SchedulerHandle,
    calibrator: Arc<Calibrator>,
}

impl CommandRouter {
    pub fn new(scheduler: SchedulerHandle, calibrator: Arc<Calibrator>) -> Self {
        Self {
            scheduler,
            calibrator,
        }
    }

    /// Runs `command` for `operator` and returns the reply to show them.
    ///
    /// `setpos` returns as soon as the request is open; the rest of the flow
    /// runs on its own thread and reports through the log.
    pub fn dispatch(&self, operator: &str, command: Command) -> DisplayResult<String> {
        match command {
            Command::SetPos => {
                let pending = self.calibrator.begin(operator);
                let calibrator = Arc::clone(&self.calibrator);
                let scheduler = self.scheduler.clone();
                let operator_name = operator.to_string();
                thread::Builder::new()
                    .name("setpos".to_string())
                    .spawn(move || {
                        match calibrator.complete(&operator_name, pending, &scheduler) {
                            Ok(anchor) => info!(
                                "{}: display moved to {} facing {:?}",
                                operator_name, anchor.location, anchor.orientation
                            ),
                            Err(e) => warn!("{}: position not set: {}", operator_name, e),
                        }
                    })
                    .map_err(|e| {
                        error!("CommandRouter: failed to spawn setpos thread: {}", e);
                        DisplayError::Host(e.to_string())
                    })?;
                Ok("Stand where the display should start and type 'ok' within 30 seconds."
                    .to_string())
            }
            Command::Marquee(text) => {
                self.scheduler.start_marquee(&text)?;
                Ok(format!("Showing '{}'.", text))
            }
            Command::Clear => {
                self.scheduler.clear()?;
                Ok("Display cleared.".to_string())
            }
            Command::Ok(text) => {
                if self.calibrator.confirm(operator, text) {
                    Ok("Confirmed.".to_string())
                } else {
                    warn!("{}: ok without a pending setpos", operator);
                    Ok("Nothing to confirm.".to_string())
                }
            }
        }
    }
}
