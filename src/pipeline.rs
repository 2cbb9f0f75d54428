//! One input source end to end: decode → filter → dispatch, plus aging
//! and the per-input view the renderer reads every frame.
//!
//! A session is single-writer. Run `tick` and `sweep` from the same host
//! update loop; separate controllers get separate sessions.

use log::{debug, trace};
use serde::Serialize;

use crate::config::Profile;
use crate::decode::Decoder;
use crate::dispatch::{InputTable, StateChange};
use crate::error::Result;
use crate::filter::{FilterConfig, NoiseFilter};
use crate::history::{IntervalHistory, Timestamp};
use crate::smoothing::MouseSmoother;
use crate::state::ControllerState;
use crate::timeline::{Segment, TimelineConfig, segments_for};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub frames: u64,
    pub recognized: u64,
    pub unrecognized: u64,
    pub changes: u64,
}

/// What the renderer needs for one tracked input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputView {
    pub name: String,
    pub pressed: bool,
    pub pressed_ms: Timestamp,
    pub presses_last_second: usize,
    pub segments: Vec<Segment>,
}

#[derive(Debug)]
pub struct Session {
    decoder: Decoder,
    mouse: MouseSmoother,
    filter: NoiseFilter,
    inputs: InputTable,
    timeline: TimelineConfig,
    last: Option<ControllerState>,
    counters: SessionCounters,
}

impl Session {
    pub fn new<I, S>(decoder: Decoder, tracked: I, filter: FilterConfig, timeline: TimelineConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inputs = InputTable::new(tracked);
        let mut filter = NoiseFilter::new(filter);
        filter.set_tracked(inputs.names());
        Self {
            decoder,
            mouse: MouseSmoother::default(),
            filter,
            inputs,
            timeline,
            last: None,
            counters: SessionCounters::default(),
        }
    }

    pub fn from_profile(p: &Profile) -> Result<Self> {
        let mut s = Self::new(
            p.decoder()?,
            p.inputs.tracked.iter().cloned(),
            p.filter.clone(),
            p.timeline.clone(),
        );
        s.mouse = MouseSmoother::new(p.source.mouse_radius);
        debug!(
            "session: format={} inputs={} filter={} mouse={}",
            s.decoder.name(),
            s.inputs.len(),
            s.filter.config().enabled(),
            s.decoder.uses_smoothing()
        );
        Ok(s)
    }

    pub fn decoder(&self) -> Decoder {
        self.decoder
    }

    pub fn inputs(&self) -> &InputTable {
        &self.inputs
    }

    pub fn filter(&self) -> &NoiseFilter {
        &self.filter
    }

    pub fn timeline(&self) -> &TimelineConfig {
        &self.timeline
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    /// Last state handed to the dispatcher (after filtering).
    pub fn last_state(&self) -> Option<&ControllerState> {
        self.last.as_ref()
    }

    /// Feed one frame. Returns the recorded transitions, or `None` when the
    /// frame was not recognized by the decoder (nothing else changes then).
    pub fn tick(&mut self, frame: &[u8], now: Timestamp, frame_no: Option<u64>) -> Option<Vec<StateChange>> {
        self.counters.frames += 1;
        let Some(decoded) = self.decoder.decode(frame, &mut self.mouse) else {
            self.counters.unrecognized += 1;
            trace!("{}: unrecognized frame ({} bytes)", self.decoder.name(), frame.len());
            return None;
        };
        self.counters.recognized += 1;

        let state = self.filter.process(decoded);
        let changes = self.inputs.apply(&state, now, frame_no);
        self.counters.changes += changes.len() as u64;
        self.last = Some(state);
        Some(changes)
    }

    /// Age out history that can no longer be seen, fade delay included.
    pub fn sweep(&mut self, now: Timestamp) {
        self.inputs.remove_old_state_changes(self.timeline.horizon(now));
    }

    /// Switch the tracked inputs. Histories start over.
    pub fn reconfigure<I, S>(&mut self, tracked: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.reconfigure(tracked);
        self.filter.set_tracked(self.inputs.names());
    }

    pub fn view(&self, input: &str, now: Timestamp) -> Result<InputView> {
        let h = self.inputs.history(input)?;
        Ok(self.view_of(input, h, now))
    }

    /// Views for every tracked input, in display order.
    pub fn snapshot(&self, now: Timestamp) -> Vec<InputView> {
        self.inputs
            .iter()
            .map(|(name, h)| self.view_of(name, h, now))
            .collect()
    }

    fn view_of(&self, name: &str, h: &IntervalHistory, now: Timestamp) -> InputView {
        InputView {
            name: name.to_string(),
            pressed: h.is_pressed(),
            pressed_ms: h.pressed_elapsed(now),
            presses_last_second: h.pressed_count_last_second(now),
            segments: segments_for(h, now, &self.timeline),
        }
    }
}
