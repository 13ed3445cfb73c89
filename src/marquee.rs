// src/marquee.rs

//! Scrolling text: turns a message into the timed sequence of strings the
//! display shows while a marquee owns it.
//!
//! Text is laid out in pairs of characters separated by suppressed colons, so
//! a message reuses the digit cells of the clock face. A message that fits is
//! shown once. A longer one is shown from its start, scrolled left one
//! character per step until its end is in view, and then wiped from the left.

use crate::display::engine::BLANK_COLON;
use std::time::Duration;

/// How long a message that fits stays up.
pub const FIT_HOLD: Duration = Duration::from_secs(5);
/// How long the opening window of a long message stays up.
pub const OPENING_HOLD: Duration = Duration::from_secs(2);
/// Delay between scroll and wipe steps.
pub const STEP: Duration = Duration::from_millis(500);
/// How long the last frame stays up before the display is released.
pub const FINAL_HOLD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarqueeFrame {
    pub text: String,
    /// Time to wait after showing this frame.
    pub hold: Duration,
}

/// Lays out `cells` in pairs separated by suppressed colons.
///
/// `ABCDEF` becomes `AB;CD;EF`; an odd tail is left on its own (`ABC` becomes
/// `AB;C`).
pub fn layout(cells: &[char]) -> String {
    let mut out = String::with_capacity(cells.len() * 3 / 2);
    for (i, pair) in cells.chunks(2).enumerate() {
        if i > 0 {
            out.push(BLANK_COLON);
        }
        out.extend(pair);
    }
    out
}

/// Frames for showing `text` on a face of `limit` cells.
pub fn script(text: &str, limit: usize) -> Vec<MarqueeFrame> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return vec![MarqueeFrame {
            text: layout(&chars),
            hold: FIT_HOLD,
        }];
    }

    let mut frames = Vec::with_capacity(chars.len() + 1);
    frames.push(MarqueeFrame {
        text: layout(&chars[..limit]),
        hold: OPENING_HOLD,
    });
    for start in 1..=chars.len() - limit {
        frames.push(MarqueeFrame {
            text: layout(&chars[start..start + limit]),
            hold: STEP,
        });
    }

    // Wipe: the trailing characters stay right-aligned while blanks grow in
    // from the left until the face is empty.
    let tail = &chars[chars.len() - limit..];
    for shown in (0..limit).rev() {
        let mut cells = vec![' '; limit - shown];
        cells.extend_from_slice(&tail[limit - shown..]);
        frames.push(MarqueeFrame {
            text: layout(&cells),
            hold: STEP,
        });
    }
    if let Some(last) = frames.last_mut() {
        last.hold = FINAL_HOLD;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn texts(frames: &[MarqueeFrame]) -> Vec<&str> {
        frames.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn layout_pairs_cells() {
        let cells: Vec<char> = "ABCDEF".chars().collect();
        assert_eq!(layout(&cells), "AB;CD;EF");
        assert_eq!(layout(&cells[..3]), "AB;C");
        assert_eq!(layout(&[]), "");
    }

    #[test]
    fn short_text_is_shown_once() {
        let frames = script("HELLO", 6);
        assert_eq!(
            frames,
            vec![MarqueeFrame {
                text: "HE;LL;O".to_string(),
                hold: FIT_HOLD
            }]
        );
    }

    #[test]
    fn long_text_scrolls_then_wipes() {
        let frames = script("ABCDEFGH", 6);
        assert_eq!(
            texts(&frames),
            vec![
                "AB;CD;EF", // opening
                "BC;DE;FG",
                "CD;EF;GH",
                " D;EF;GH", // wipe
                "  ;EF;GH",
                "  ; F;GH",
                "  ;  ;GH",
                "  ;  ; H",
                "  ;  ;  ",
            ]
        );
        assert_eq!(frames[0].hold, OPENING_HOLD);
        assert!(frames[1..frames.len() - 1].iter().all(|f| f.hold == STEP));
        assert_eq!(frames.last().unwrap().hold, FINAL_HOLD);
    }

    #[test]
    fn every_frame_keeps_the_face_layout() {
        for frame in script("SCROLLING MESSAGE", 8) {
            assert_eq!(frame.text.chars().count(), 11, "{:?}", frame.text);
        }
    }
}
