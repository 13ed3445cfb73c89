// src/scheduler/tests.rs

use super::*;
use crate::clock::ClockMode;
use crate::config::ClockConfig;
use crate::geometry::{Anchor, QuarterTurns};
use crate::glyph::tests::shipped_library;
use crate::host::mock::{HostCall, RecordingPlacement};
use crate::host::Owner;
use crate::renderer::Renderer;
use test_log::test;

fn display(placement: &RecordingPlacement) -> Display {
    let library = Arc::new(shipped_library());
    let renderer = Renderer::new(Owner::display("id"), library.palette(), [255; 4], None);
    Display::new(
        library,
        renderer,
        Arc::new(QuarterTurns),
        Anchor::default(),
        Box::new(placement.clone()),
    )
}

fn actor(placement: &RecordingPlacement, clock: ClockConfig) -> (DisplayActor, OverrideFlag) {
    let flag = OverrideFlag::default();
    let clock = ClockSource::new(clock, 0);
    (
        DisplayActor::new(display(placement), clock, flag.clone()),
        flag,
    )
}

fn elapsed_countdown() -> ClockConfig {
    ClockConfig {
        mode: ClockMode::Countdown,
        target_unix: 0,
        colon_blink: true,
        ..ClockConfig::default()
    }
}

/// Counting up from the epoch never reads zero.
fn running_countup() -> ClockConfig {
    ClockConfig {
        mode: ClockMode::Countup,
        colon_blink: true,
        ..ClockConfig::default()
    }
}

#[test]
fn idle_ticks_alternate_zero_and_blank() {
    let placement = RecordingPlacement::new();
    let (mut actor, _) = actor(&placement, elapsed_countdown());
    let now = Instant::now();

    let mut seen = Vec::new();
    for _ in 0..3 {
        assert!(actor.handle(DisplayMessage::Tick, now));
        seen.push(actor.display().current());
    }
    assert_eq!(seen, vec!["00:00:00", "  ;  ;  ", "00:00:00"]);
    // Idle frames never schedule a colon blink.
    assert_eq!(actor.blink_deadline(), None);
}

#[test]
fn ticks_are_dropped_while_a_marquee_owns_the_display() {
    let placement = RecordingPlacement::new();
    let (mut actor, flag) = actor(&placement, elapsed_countdown());
    flag.acquire().unwrap();

    actor.handle(DisplayMessage::Tick, Instant::now());
    assert_eq!(actor.display().current(), "");
    assert!(placement.log().calls.is_empty());

    actor.handle(DisplayMessage::Frame("HE;LL;O".to_string()), Instant::now());
    assert_eq!(actor.display().current(), "HE;LL;O");
}

#[test]
fn colon_blink_fires_after_its_delay() {
    let placement = RecordingPlacement::new();
    let (mut actor, _) = actor(&placement, running_countup());
    let now = Instant::now();

    actor.handle(DisplayMessage::Tick, now);
    let shown = actor.display().current();
    assert!(shown.contains(':'));
    assert_eq!(actor.blink_deadline(), Some(now + COLON_BLINK_DELAY));

    actor.on_deadline(now + Duration::from_millis(100));
    assert_eq!(actor.display().current(), shown);

    let cleared_before = placement.log().cleared_regions().len();
    actor.on_deadline(now + COLON_BLINK_DELAY);
    assert_eq!(actor.display().current(), shown.replace(':', ";"));
    assert_eq!(
        placement.log().cleared_regions().len(),
        cleared_before + shown.matches(':').count()
    );
    assert_eq!(actor.blink_deadline(), None);
}

#[test]
fn marquee_frame_cancels_pending_blink() {
    let placement = RecordingPlacement::new();
    let (mut actor, _) = actor(&placement, running_countup());
    let now = Instant::now();
    actor.handle(DisplayMessage::Tick, now);
    assert!(actor.blink_deadline().is_some());

    actor.handle(DisplayMessage::Frame("AB;CD;EF".to_string()), now);
    assert_eq!(actor.blink_deadline(), None);
    actor.on_deadline(now + COLON_BLINK_DELAY);
    assert_eq!(actor.display().current(), "AB;CD;EF");
}

#[test]
fn bad_frame_is_logged_not_fatal() {
    let placement = RecordingPlacement::new();
    let (mut actor, _) = actor(&placement, elapsed_countdown());
    assert!(actor.handle(DisplayMessage::Frame("?!".to_string()), Instant::now()));
    assert_eq!(actor.display().current(), "");
    assert!(actor.handle(DisplayMessage::Tick, Instant::now()));
    assert_eq!(actor.display().current(), "00:00:00");
}

#[test]
fn shutdown_stops_the_actor() {
    let placement = RecordingPlacement::new();
    let (mut actor, _) = actor(&placement, elapsed_countdown());
    assert!(!actor.handle(DisplayMessage::Shutdown, Instant::now()));
}

#[test]
fn marquee_is_exclusive_until_it_finishes() {
    let (tx, rx) = mpsc::channel();
    let flag = OverrideFlag::default();
    let handle = SchedulerHandle::new(tx, flag.clone(), 6);

    let running = handle.start_marquee("hi").unwrap();
    assert!(handle.marquee_active());
    assert_eq!(
        handle.start_marquee("again").map(|_| ()),
        Err(DisplayError::AlreadyActive)
    );

    running.join().unwrap();
    assert!(!flag.is_set());
    let frames: Vec<String> = rx
        .try_iter()
        .filter_map(|m| match m {
            DisplayMessage::Frame(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(frames, vec!["HI"]);
}

#[test]
fn undrawable_marquee_is_rejected_before_taking_the_display() {
    let (tx, _rx) = mpsc::channel();
    let handle = SchedulerHandle::new(tx, OverrideFlag::default(), 6);
    assert_eq!(
        handle.start_marquee("50% off").map(|_| ()),
        Err(DisplayError::UnsupportedCharacter('%'))
    );
    assert!(!handle.marquee_active());
}

#[test]
fn commands_reach_the_running_actor() {
    let placement = RecordingPlacement::new();
    let (actor, flag) = actor(&placement, elapsed_countdown());
    let (tx, rx) = mpsc::channel();
    let handle = SchedulerHandle::new(tx.clone(), flag, 6);
    let thread = thread::spawn(move || actor.run(rx));

    handle.tick().unwrap();
    handle.clear().unwrap();
    let anchor = Anchor {
        location: crate::geometry::Vec3::new(1, 1, 1),
        ..Anchor::default()
    };
    handle.move_to(anchor).unwrap();
    tx.send(DisplayMessage::Shutdown).unwrap();
    thread.join().unwrap();

    let log = placement.log();
    assert!(matches!(log.calls.first(), Some(HostCall::Place { .. })));
    let owned_clears = log
        .calls
        .iter()
        .filter(|c| matches!(c, HostCall::ClearOwned(_)))
        .count();
    assert_eq!(owned_clears, 2);
    drop(log);
    assert_eq!(handle.move_to(anchor), Err(closed()));
}
