//! Three-frame noise filter.
//!
//! Keeps the last three decoded states plus the last state that passed
//! through untouched. Single-frame button flips are forced off, analog
//! spikes fall back to the trusted value, and a frame where most inputs
//! went active at once is thrown away in favour of the trusted state.

use log::debug;
use serde::Deserialize;

use crate::state::ControllerState;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Single-frame button glitch rejection.
    pub buttons: bool,
    /// Analog spike rejection.
    pub analogs: bool,
    /// Count analog jumps as activity for the mass revert.
    pub mass: bool,
    /// Share of tracked inputs that may be active before the frame is
    /// reverted. Without a tracked set every button of the frame counts.
    pub mass_ratio: f32,
    /// A jump bigger than this between middle and newest is a spike ...
    pub analog_jump: f32,
    /// ... if the previous step was smaller than this.
    pub analog_still: f32,
    /// Frame-to-frame delta that makes an analog "active" in mass mode.
    pub analog_active: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            buttons: false,
            analogs: false,
            mass: false,
            mass_ratio: 0.8,
            analog_jump: 0.5,
            analog_still: 0.1,
            analog_active: 0.3,
        }
    }
}

impl FilterConfig {
    pub fn enabled(&self) -> bool {
        self.buttons || self.analogs || self.mass
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub frames: u64,
    pub filtered: u64,
    pub reverted: u64,
}

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    cfg: FilterConfig,
    /// oldest, middle, newest
    window: [ControllerState; 3],
    trusted: ControllerState,
    /// Buttons the mass revert counts over; `None` means all of them.
    tracked: Option<Vec<String>>,
    stats: FilterStats,
}

fn analog_value(state: &ControllerState, name: &str) -> f32 {
    state.analog(name).map(|a| a.value).unwrap_or(0.0)
}

impl NoiseFilter {
    pub fn new(cfg: FilterConfig) -> Self {
        Self {
            cfg,
            window: Default::default(),
            trusted: ControllerState::neutral(),
            tracked: None,
            stats: FilterStats::default(),
        }
    }

    /// Restrict the mass-revert count to the inputs a source displays.
    pub fn set_tracked<I, S>(&mut self, tracked: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracked = Some(tracked.into_iter().map(Into::into).collect());
    }

    pub fn config(&self) -> &FilterConfig {
        &self.cfg
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Last state that passed through unmodified.
    pub fn trusted(&self) -> &ControllerState {
        &self.trusted
    }

    pub fn process(&mut self, state: ControllerState) -> ControllerState {
        if !self.cfg.enabled() {
            return state;
        }
        self.stats.frames += 1;

        self.window.rotate_left(1);
        self.window[2] = state;
        let [oldest, middle, newest] = &self.window;

        let mut filtered = false;
        let mut out = newest.to_builder();

        if self.cfg.buttons {
            for name in oldest.button_names() {
                let n = newest.button(name);
                if oldest.button(name) == n && n != middle.button(name) {
                    if newest.has_button(name) {
                        out.set_button(name, false);
                    }
                    filtered = true;
                }
            }
        }

        if self.cfg.analogs {
            for name in newest.analog_names() {
                let n = analog_value(newest, name);
                let m = analog_value(middle, name);
                let o = analog_value(oldest, name);
                if (n - m).abs() > self.cfg.analog_jump && (m - o).abs() < self.cfg.analog_still {
                    let t = self.trusted.analog(name).unwrap_or_default();
                    out.set_analog(name, t.value, t.raw);
                    filtered = true;
                }
            }
        }

        let (mut active, mut total) = match &self.tracked {
            Some(names) => (
                names.iter().filter(|n| newest.button(n)).count(),
                names.len(),
            ),
            None => (newest.pressed_count(), newest.button_names().len()),
        };
        if self.cfg.mass {
            total += newest.analog_names().len();
            active += newest
                .analog_names()
                .iter()
                .filter(|name| {
                    (analog_value(newest, name) - analog_value(middle, name)).abs()
                        > self.cfg.analog_active
                })
                .count();
        }
        if total > 0 && active as f32 > self.cfg.mass_ratio * total as f32 {
            debug!("filter: reverting frame, {active}/{total} inputs active");
            self.stats.reverted += 1;
            return self.trusted.clone();
        }

        if !filtered {
            self.trusted = newest.clone();
            return newest.clone();
        }
        self.stats.filtered += 1;
        out.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ControllerStateBuilder;

    const NAMES: [&str; 10] = ["a", "b", "x", "y", "l", "r", "up", "down", "left", "right"];

    fn pad(pressed: &[&str]) -> ControllerState {
        let mut b = ControllerStateBuilder::new();
        for n in NAMES {
            b.set_button(n, pressed.contains(&n));
        }
        b.build()
    }

    fn stick(v: f32) -> ControllerState {
        let mut b = ControllerStateBuilder::new();
        b.set_button("a", false).set_analog("x", v, (v * 128.0) as i32);
        b.build()
    }

    fn all_on() -> FilterConfig {
        FilterConfig {
            buttons: true,
            analogs: true,
            mass: true,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn disabled_is_pass_through() {
        let mut f = NoiseFilter::new(FilterConfig::default());
        let glitchy = pad(&NAMES);
        assert_eq!(f.process(glitchy.clone()), glitchy);
        assert_eq!(f.stats(), FilterStats::default());
    }

    #[test]
    fn single_frame_flip_is_forced_off() {
        let mut f = NoiseFilter::new(all_on());
        f.process(pad(&["a"]));
        f.process(pad(&[]));
        let out = f.process(pad(&["a"]));
        assert!(!out.button("a"));
        assert_eq!(f.stats().filtered, 1);
        // the trusted state is the last unfiltered one
        assert!(!f.trusted().button("a"));
    }

    #[test]
    fn steady_press_passes() {
        let mut f = NoiseFilter::new(all_on());
        f.process(pad(&["a"]));
        f.process(pad(&["a"]));
        let out = f.process(pad(&["a"]));
        assert!(out.button("a"));
        assert_eq!(f.stats().filtered, 0);
    }

    #[test]
    fn first_frames_see_neutral_window() {
        let mut f = NoiseFilter::new(all_on());
        assert!(f.process(pad(&["b"])).button("b"));
        assert!(f.process(pad(&["b"])).button("b"));
    }

    #[test]
    fn mass_change_reverts_to_trusted() {
        let mut f = NoiseFilter::new(all_on());
        let calm = pad(&["a"]);
        f.process(calm.clone());
        f.process(calm.clone());
        let out = f.process(pad(&NAMES[..9]));
        assert_eq!(out, calm);
        assert_eq!(f.stats().reverted, 1);
    }

    #[test]
    fn eighty_percent_exactly_is_kept() {
        let mut f = NoiseFilter::new(FilterConfig {
            buttons: true,
            ..FilterConfig::default()
        });
        let out = f.process(pad(&NAMES[..8]));
        assert_eq!(out.pressed_count(), 8);
    }

    #[test]
    fn mass_revert_counts_tracked_inputs_only() {
        let mut f = NoiseFilter::new(FilterConfig {
            buttons: true,
            ..FilterConfig::default()
        });
        f.set_tracked(["a", "b", "x", "y"]);
        let calm = pad(&[]);
        f.process(calm.clone());
        // 4 of 10 buttons, but every tracked one
        let out = f.process(pad(&["a", "b", "x", "y"]));
        assert_eq!(out, calm);
        assert_eq!(f.stats().reverted, 1);

        let mut all = NoiseFilter::new(FilterConfig {
            buttons: true,
            ..FilterConfig::default()
        });
        all.process(calm.clone());
        assert!(all.process(pad(&["a", "b", "x", "y"])).button("a"));
    }

    #[test]
    fn analog_spike_uses_trusted_value() {
        let mut f = NoiseFilter::new(FilterConfig {
            analogs: true,
            ..FilterConfig::default()
        });
        f.process(stick(0.1));
        f.process(stick(0.1));
        f.process(stick(0.1));
        let out = f.process(stick(0.9));
        let x = out.analog("x").expect("x");
        assert_eq!(x.value, 0.1);
        assert_eq!(x.raw, 12);
    }

    #[test]
    fn analog_ramp_is_not_a_spike() {
        let mut f = NoiseFilter::new(FilterConfig {
            analogs: true,
            ..FilterConfig::default()
        });
        f.process(stick(0.0));
        f.process(stick(0.3));
        let out = f.process(stick(0.9));
        assert_eq!(out.analog("x").map(|a| a.value), Some(0.9));
    }

    #[test]
    fn mass_mode_counts_analog_jumps() {
        let mut f = NoiseFilter::new(FilterConfig {
            mass: true,
            ..FilterConfig::default()
        });
        let mut b = ControllerStateBuilder::new();
        b.set_analog("x", 0.0, 0).set_analog("y", 0.0, 0);
        let still = b.build();
        f.process(still.clone());

        let mut b = ControllerStateBuilder::new();
        b.set_analog("x", 1.0, 127).set_analog("y", -1.0, -127);
        let out = f.process(b.build());
        assert_eq!(out, still);
    }
}
