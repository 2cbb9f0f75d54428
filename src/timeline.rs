//! Scrolling timeline geometry.
//!
//! Offsets and lengths are in pixels along the scroll axis, measured back
//! from the live edge (offset 0 is "now"). The renderer maps them onto
//! whichever direction its timeline scrolls.

use serde::{Deserialize, Serialize};

use crate::history::{IntervalHistory, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub offset: u32,
    pub length: u32,
}

impl Segment {
    pub fn end(&self) -> u32 {
        self.offset + self.length
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    pub pixels_per_ms: f64,
    /// Visible length of the timeline in pixels.
    pub max_length: u32,
    /// Extra time history is kept past the visible edge, for fade-out.
    pub fade_delay_ms: Timestamp,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pixels_per_ms: 0.05,
            max_length: 150,
            fade_delay_ms: 0,
        }
    }
}

impl TimelineConfig {
    /// Time span covered by the visible timeline.
    pub fn visible_ms(&self) -> Timestamp {
        if self.pixels_per_ms <= 0.0 {
            return 0;
        }
        (f64::from(self.max_length) / self.pixels_per_ms).ceil() as Timestamp
    }

    /// Oldest timestamp still drawn at `now`.
    pub fn min_age(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.visible_ms())
    }

    /// Aging horizon: visible span plus the fade delay.
    pub fn horizon(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.visible_ms() + self.fade_delay_ms)
    }
}

fn to_px(ms: Timestamp, pixels_per_ms: f64) -> u32 {
    (ms as f64 * pixels_per_ms).round().max(0.0) as u32
}

/// Segments for the pressed intervals of `history`, newest first.
///
/// Both edges of an interval are rounded from their distance to `now`, and
/// each segment starts no earlier than the end of the one before it, so
/// segments never overlap even when the one pixel minimum kicks in.
pub fn build_segments(
    history: &IntervalHistory,
    min_age: Timestamp,
    now: Timestamp,
    pixels_per_ms: f64,
    max_length: u32,
) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut consumed = 0u32;

    for iv in history.iter().rev() {
        let end = iv.effective_end(now).min(now);
        if end < min_age || consumed >= max_length {
            break;
        }
        let start = iv.start.max(min_age).min(end);

        let near = to_px(now - end, pixels_per_ms);
        let far = to_px(now - start, pixels_per_ms);
        let edge = out.last().map_or(0, Segment::end);
        let offset = near.max(edge);
        let length = far.saturating_sub(offset).max(1);
        consumed = consumed.max(offset.saturating_add(length));

        if !iv.pressed {
            continue;
        }
        if offset >= max_length {
            break;
        }
        out.push(Segment {
            offset,
            length: length.min(max_length - offset),
        });
    }
    out
}

/// [`build_segments`] with window and scale taken from `cfg`.
pub fn segments_for(history: &IntervalHistory, now: Timestamp, cfg: &TimelineConfig) -> Vec<Segment> {
    build_segments(history, cfg.min_age(now), now, cfg.pixels_per_ms, cfg.max_length)
}
