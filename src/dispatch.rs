//! Change dispatch: diff each decoded frame against the recorded pressed
//! flags and append transitions to the per-input histories.

use crate::error::{Result, RetroviewError};
use crate::history::{IntervalHistory, Timestamp};
use crate::state::ControllerState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub input: String,
    pub pressed: bool,
    pub time: Timestamp,
    pub frame: Option<u64>,
}

#[derive(Debug, Clone)]
struct Tracked {
    name: String,
    history: IntervalHistory,
}

/// Histories for the inputs one source is configured to show, in display
/// order.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    inputs: Vec<Tracked>,
}

impl InputTable {
    pub fn new<I, S>(tracked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        table.reconfigure(tracked);
        table
    }

    /// Replace the tracked set. Every history starts over empty.
    pub fn reconfigure<I, S>(&mut self, tracked: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.clear();
        for name in tracked {
            let name = name.into();
            if self.inputs.iter().any(|t| t.name == name) {
                continue;
            }
            self.inputs.push(Tracked {
                name,
                history: IntervalHistory::new(),
            });
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn history(&self, input: &str) -> Result<&IntervalHistory> {
        self.inputs
            .iter()
            .find(|t| t.name == input)
            .map(|t| &t.history)
            .ok_or_else(|| RetroviewError::UntrackedInput(input.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IntervalHistory)> {
        self.inputs.iter().map(|t| (t.name.as_str(), &t.history))
    }

    /// Record every tracked input whose pressed flag differs from its
    /// history. `frame` is stored next to the timestamp, never compared.
    pub fn apply(
        &mut self,
        state: &ControllerState,
        time: Timestamp,
        frame: Option<u64>,
    ) -> Vec<StateChange> {
        let mut changes = Vec::new();
        for t in &mut self.inputs {
            let pressed = state.button(&t.name);
            if pressed == t.history.is_pressed() {
                continue;
            }
            match frame {
                Some(n) => t.history.add_state_change_at_frame(pressed, time, n),
                None => t.history.add_state_change(pressed, time),
            }
            changes.push(StateChange {
                input: t.name.clone(),
                pressed,
                time,
                frame,
            });
        }
        changes
    }

    pub fn remove_old_state_changes(&mut self, horizon: Timestamp) {
        for t in &mut self.inputs {
            t.history.remove_old_state_changes(horizon);
        }
    }
}
