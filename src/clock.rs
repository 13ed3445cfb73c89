// src/clock.rs

//! Produces the string the clock shows on each tick.

use crate::config::ClockConfig;
use crate::display::engine::{BLANK_COLON, COLON};
use chrono::{DateTime, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;
const HALF_DAY: i64 = 43_200;
/// The day field, and the hour field without days, count 0..=98.
pub const DAY_WRAP: i64 = 99;

/// What the clock counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Time remaining until a target timestamp, stopping at zero.
    Countdown,
    /// Time since the process started.
    Countup,
    /// Time of day.
    #[default]
    Time,
}

/// One value to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFrame {
    pub text: String,
    /// Schedule the colon blink follow-up after rendering this frame.
    pub blink_colons: bool,
}

pub struct ClockSource {
    settings: ClockConfig,
    started_unix: i64,
    idle_blank: bool,
}

impl ClockSource {
    pub fn new(settings: ClockConfig, started_unix: i64) -> Self {
        Self {
            settings,
            started_unix,
            idle_blank: false,
        }
    }

    /// Cells available to a marquee: one per digit of the clock face.
    pub fn cell_limit(&self) -> usize {
        if self.settings.show_days {
            8
        } else {
            6
        }
    }

    /// Seconds the clock should display at `now`.
    pub fn value_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> i64 {
        match self.settings.mode {
            ClockMode::Countdown => (self.settings.target_unix - now.timestamp()).max(0),
            ClockMode::Countup => (now.timestamp() - self.started_unix).max(0),
            ClockMode::Time => {
                let seconds = i64::from(now.num_seconds_from_midnight());
                if self.settings.twelve_hour {
                    seconds % HALF_DAY
                } else {
                    seconds
                }
            }
        }
    }

    /// The frame for this tick.
    ///
    /// A zero value blinks: successive calls alternate between an all-zero face
    /// and a blank face of the same layout.
    pub fn next_frame<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> ClockFrame {
        let value = self.value_at(now);
        let text = format_clock(value, self.settings.show_days, self.hour_wrap());
        if value == 0 {
            let blank = self.idle_blank;
            self.idle_blank = !self.idle_blank;
            return ClockFrame {
                text: if blank { blank_face(&text) } else { text },
                blink_colons: false,
            };
        }
        self.idle_blank = false;
        ClockFrame {
            text,
            blink_colons: self.settings.colon_blink,
        }
    }

    pub fn next_frame_now(&mut self) -> ClockFrame {
        self.next_frame(&Local::now())
    }

    fn hour_wrap(&self) -> i64 {
        if self.settings.show_days || self.settings.mode == ClockMode::Countdown {
            24
        } else {
            DAY_WRAP
        }
    }
}

/// `HH:MM:SS`, or `DD:HH:MM:SS` with days shown.
pub fn format_clock(total_seconds: i64, show_days: bool, hour_wrap: i64) -> String {
    let t = total_seconds.max(0);
    let seconds = t % 60;
    let minutes = (t / 60) % 60;
    let hours = (t / 3600) % hour_wrap;
    if show_days {
        let days = (t / SECONDS_PER_DAY) % DAY_WRAP;
        format!("{:02}:{:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Same layout as `face` with every digit blanked and every colon suppressed.
fn blank_face(face: &str) -> String {
    face.chars()
        .map(|c| if c == COLON { BLANK_COLON } else { ' ' })
        .collect()
}
