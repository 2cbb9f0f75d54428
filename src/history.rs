//! Press/release history for one logical input.
//!
//! Intervals are appended in time order and never reordered. Only the last
//! interval may be open; everything before it is completed with
//! `end >= start`.

use std::collections::VecDeque;

/// Milliseconds on the caller's clock.
pub type Timestamp = u64;

pub const ONE_SECOND_MS: Timestamp = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub pressed: bool,
    pub start: Timestamp,
    /// `None` while the interval is still current.
    pub end: Option<Timestamp>,
    pub completed: bool,
    /// Host frame counter at `start`, when the caller supplied one.
    pub frame: Option<u64>,
}

impl Interval {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// `end`, or `now` for the open interval.
    pub fn effective_end(&self, now: Timestamp) -> Timestamp {
        self.end.unwrap_or(now)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalHistory {
    intervals: VecDeque<Interval>,
}

impl IntervalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state_change(&mut self, pressed: bool, time: Timestamp) {
        self.push_change(pressed, time, None);
    }

    pub fn add_state_change_at_frame(&mut self, pressed: bool, time: Timestamp, frame: u64) {
        self.push_change(pressed, time, Some(frame));
    }

    fn push_change(&mut self, pressed: bool, time: Timestamp, frame: Option<u64>) {
        if let Some(last) = self.intervals.back_mut() {
            // a clock that stepped backwards still yields end >= start
            last.end = Some(time.max(last.start));
            last.completed = true;
        }
        self.intervals.push_back(Interval {
            pressed,
            start: time,
            end: None,
            completed: false,
            frame,
        });
    }

    /// Drop everything that ended before `horizon`. The open interval goes
    /// too when it is a release that started before `horizon`; an open press
    /// is kept however old it is.
    pub fn remove_old_state_changes(&mut self, horizon: Timestamp) {
        self.intervals.retain(|iv| match iv.end {
            Some(end) => !(iv.completed && end < horizon),
            None => iv.pressed || iv.start >= horizon,
        });
    }

    pub fn is_pressed(&self) -> bool {
        self.intervals.back().is_some_and(|iv| iv.pressed)
    }

    /// How long the current press has been held, zero when released.
    pub fn pressed_elapsed(&self, now: Timestamp) -> Timestamp {
        match self.intervals.back() {
            Some(iv) if iv.pressed => now.saturating_sub(iv.start),
            _ => 0,
        }
    }

    /// Number of presses that started within the last second.
    pub fn pressed_count_last_second(&self, now: Timestamp) -> usize {
        let since = now.saturating_sub(ONE_SECOND_MS);
        self.intervals
            .iter()
            .rev()
            .take_while(|iv| iv.start >= since)
            .filter(|iv| iv.pressed)
            .count()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn last(&self) -> Option<&Interval> {
        self.intervals.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Interval> {
        self.intervals.iter()
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }
}
