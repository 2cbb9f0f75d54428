//! Median smoothing and unit-circle clamp for mouse-style inputs.
//!
//! Mouse deltas from the adapters are jittery, so each axis keeps the last
//! three samples and emits their median. The smoothed vector is then split
//! into a direction (always on the circle of `max_radius`) and a magnitude
//! (clamped to that circle).

use crate::state::ControllerStateBuilder;

pub const DEFAULT_MAX_RADIUS: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
struct Window {
    slots: [f32; 3],
    pos: usize,
}

impl Window {
    fn push(&mut self, v: f32) -> f32 {
        self.slots[self.pos] = v;
        self.pos = (self.pos + 1) % self.slots.len();
        median3(self.slots[0], self.slots[1], self.slots[2])
    }
}

fn median3(a: f32, b: f32, c: f32) -> f32 {
    a.max(b).min(a.min(b).max(c))
}

/// Smoothing context for one logical mouse source.
#[derive(Debug, Clone)]
pub struct MouseSmoother {
    x: Window,
    y: Window,
    max_radius: f32,
}

impl Default for MouseSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RADIUS)
    }
}

impl MouseSmoother {
    pub fn new(max_radius: f32) -> Self {
        Self {
            x: Window::default(),
            y: Window::default(),
            max_radius,
        }
    }

    /// Push one sample and write `mouse_center_*`, `mouse_direction_*` and
    /// `mouse_magnitude_*` analogs into `out`.
    pub fn apply(&mut self, x: f32, y: f32, x_raw: i32, y_raw: i32, out: &mut ControllerStateBuilder) {
        let mut mx = self.x.push(x);
        let mut my = self.y.push(y);

        let (mut dx, mut dy) = (mx, my);
        if mx != 0.0 || my != 0.0 {
            let angle = my.atan2(mx);
            dx = self.max_radius * angle.cos();
            dy = self.max_radius * angle.sin();
            if (mx * mx + my * my).sqrt() > self.max_radius {
                mx = dx;
                my = dy;
            }
        }

        out.set_analog("mouse_center_x", 0.0, 0)
            .set_analog("mouse_center_y", 0.0, 0)
            .set_analog("mouse_direction_x", dx, x_raw)
            .set_analog("mouse_direction_y", dy, y_raw)
            .set_analog("mouse_magnitude_x", mx, x_raw)
            .set_analog("mouse_magnitude_y", my, y_raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(sm: &mut MouseSmoother, x: f32, y: f32) -> crate::state::ControllerState {
        let mut b = ControllerStateBuilder::new();
        sm.apply(x, y, 0, 0, &mut b);
        b.build()
    }

    #[test]
    fn median_of_three() {
        assert_eq!(median3(1.0, 2.0, 3.0), 2.0);
        assert_eq!(median3(3.0, 1.0, 2.0), 2.0);
        assert_eq!(median3(2.0, 3.0, 1.0), 2.0);
        assert_eq!(median3(5.0, 5.0, -1.0), 5.0);
    }

    #[test]
    fn single_spike_is_suppressed() {
        let mut sm = MouseSmoother::default();
        run(&mut sm, 0.2, 0.0);
        run(&mut sm, 0.2, 0.0);
        let st = run(&mut sm, 0.9, 0.0);
        assert_eq!(st.analog("mouse_magnitude_x").map(|a| a.value), Some(0.2));
    }

    #[test]
    fn repeated_input_is_stable() {
        let mut sm = MouseSmoother::default();
        let a = run(&mut sm, 0.3, 0.4);
        let b = run(&mut sm, 0.3, 0.4);
        let c = run(&mut sm, 0.3, 0.4);
        let d = run(&mut sm, 0.3, 0.4);
        // first two calls still see zeros from the empty window
        assert_eq!(a.analog("mouse_magnitude_x").map(|v| v.value), Some(0.0));
        assert_eq!(b.analog("mouse_magnitude_x").map(|v| v.value), Some(0.3));
        assert_eq!(c, d);
    }

    #[test]
    fn magnitude_is_clamped_to_radius() {
        let mut sm = MouseSmoother::default();
        for _ in 0..3 {
            run(&mut sm, 3.0, 4.0);
        }
        let st = run(&mut sm, 3.0, 4.0);
        let mx = st.analog("mouse_magnitude_x").map(|a| a.value).unwrap_or_default();
        let my = st.analog("mouse_magnitude_y").map(|a| a.value).unwrap_or_default();
        assert!((mx - 0.6).abs() < 1e-5);
        assert!((my - 0.8).abs() < 1e-5);
        let dx = st.analog("mouse_direction_x").map(|a| a.value).unwrap_or_default();
        assert!((dx - 0.6).abs() < 1e-5);
        assert_eq!(st.analog("mouse_center_x").map(|a| a.value), Some(0.0));
    }

    #[test]
    fn zero_vector_has_zero_direction() {
        let mut sm = MouseSmoother::new(2.0);
        let st = run(&mut sm, 0.0, 0.0);
        assert_eq!(st.analog("mouse_direction_x").map(|a| a.value), Some(0.0));
        assert_eq!(st.analog("mouse_direction_y").map(|a| a.value), Some(0.0));
    }
}
