//! Canonical controller state produced by the decoders.

use std::collections::HashMap;

/// One analog reading: normalized value plus the raw sample it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Analog {
    pub value: f32,
    pub raw: i32,
}

impl Analog {
    pub fn new(value: f32, raw: i32) -> Self {
        Self { value, raw }
    }
}

/// Decoded state of one frame. Immutable once built.
///
/// Buttons are stored under their as-given name and under the lower/upper
/// case variants of it, so a lookup for `"A"` or `"a"` both resolve. The
/// as-given names are also kept in insertion order; that list is what the
/// noise filter and the mass-revert counter iterate over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    buttons: HashMap<String, bool>,
    button_order: Vec<String>,
    analogs: HashMap<String, Analog>,
    analog_order: Vec<String>,
    aux: Option<Vec<u8>>,
}

impl ControllerState {
    /// Empty all-zero state.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Pressed flag for `name`; unknown names read as released.
    pub fn button(&self, name: &str) -> bool {
        self.buttons.get(name).copied().unwrap_or(false)
    }

    pub fn has_button(&self, name: &str) -> bool {
        self.buttons.contains_key(name)
    }

    pub fn analog(&self, name: &str) -> Option<Analog> {
        self.analogs.get(name).copied()
    }

    pub fn button_names(&self) -> &[String] {
        &self.button_order
    }

    pub fn analog_names(&self) -> &[String] {
        &self.analog_order
    }

    /// Every key of the button map, case variants included.
    pub fn button_map(&self) -> &HashMap<String, bool> {
        &self.buttons
    }

    /// Auxiliary payload (e.g. printer bytes) for formats that carry one.
    pub fn aux(&self) -> Option<&[u8]> {
        self.aux.as_deref()
    }

    pub fn pressed_count(&self) -> usize {
        self.button_order
            .iter()
            .filter(|name| self.button(name))
            .count()
    }

    /// Re-open this state for editing. The filter uses this to build its
    /// corrected output from the newest frame.
    pub(crate) fn to_builder(&self) -> ControllerStateBuilder {
        ControllerStateBuilder {
            state: self.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ControllerStateBuilder {
    state: ControllerState,
}

impl ControllerStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, name: &str, pressed: bool) -> &mut Self {
        let st = &mut self.state;
        if !st.buttons.contains_key(name) {
            st.button_order.push(name.to_string());
        }
        st.buttons.insert(name.to_string(), pressed);
        st.buttons.insert(name.to_lowercase(), pressed);
        st.buttons.insert(name.to_uppercase(), pressed);
        self
    }

    pub fn set_analog(&mut self, name: &str, value: f32, raw: i32) -> &mut Self {
        let st = &mut self.state;
        if !st.analogs.contains_key(name) {
            st.analog_order.push(name.to_string());
        }
        st.analogs.insert(name.to_string(), Analog::new(value, raw));
        self
    }

    pub fn set_aux(&mut self, payload: Vec<u8>) -> &mut Self {
        self.state.aux = Some(payload);
        self
    }

    pub fn build(self) -> ControllerState {
        self.state
    }
}
