//! MiSTer-style ASCII bit stream.
//!
//! ```text
//! [axes: 8][buttons: 8][button bytes...][axis blocks: 32 each...][trailer: 1]
//! ```
//! Every byte is one bit, `'0'` meaning clear. Counts and axis values are
//! packed LSB first by position.

use super::bits::{ascii_bit, ascii_lsb_first};
use crate::state::{ControllerState, ControllerStateBuilder};

const HEADER_LEN: usize = 16;
const AXIS_BITS: usize = 32;
const AXIS_SCALE: f32 = i16::MAX as f32;

pub fn expected_len(axes: usize, buttons: usize) -> usize {
    HEADER_LEN + axes * AXIS_BITS + buttons + 1
}

pub fn decode(frame: &[u8]) -> Option<ControllerState> {
    if frame.len() < HEADER_LEN {
        return None;
    }
    let axes = ascii_lsb_first(&frame[..8]) as usize;
    let buttons = ascii_lsb_first(&frame[8..16]) as usize;
    if frame.len() != expected_len(axes, buttons) {
        return None;
    }

    let mut state = ControllerStateBuilder::new();
    let button_bytes = &frame[HEADER_LEN..HEADER_LEN + buttons];
    for (i, &b) in button_bytes.iter().enumerate() {
        state.set_button(&format!("b{i}"), ascii_bit(b));
    }

    let axis_start = HEADER_LEN + buttons;
    let values: Vec<i32> = frame[axis_start..axis_start + axes * AXIS_BITS]
        .chunks_exact(AXIS_BITS)
        .map(|block| ascii_lsb_first(block) as i32)
        .collect();
    for (i, &raw) in values.iter().enumerate() {
        state.set_analog(&format!("a{i}"), raw as f32 / AXIS_SCALE, raw);
    }

    // last two axes double as a digital pad
    if let [.., h, v] = values.as_slice() {
        state
            .set_button("left", *h < 0)
            .set_button("right", *h > 0)
            .set_button("up", *v < 0)
            .set_button("down", *v > 0);
    }

    Some(state.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(axes: u8, buttons: u8) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        for n in [axes, buttons] {
            for i in 0..8 {
                out.push(if n & (1 << i) != 0 { b'1' } else { b'0' });
            }
        }
        out
    }

    fn axis(v: i32) -> Vec<u8> {
        (0..32)
            .map(|i| if (v as u32) & (1 << i) != 0 { b'1' } else { b'0' })
            .collect()
    }

    #[test]
    fn buttons_only_frame() {
        let mut frame = header(0, 3);
        frame.extend_from_slice(b"010");
        frame.push(b'\r');
        let st = decode(&frame).expect("frame");
        assert!(!st.button("b0"));
        assert!(st.button("b1"));
        assert!(!st.button("b2"));
        assert!(!st.has_button("up"));
    }

    #[test]
    fn length_must_match_header_exactly() {
        let mut frame = header(0, 3);
        frame.extend_from_slice(b"010");
        // missing trailer
        assert!(decode(&frame).is_none());
        frame.extend_from_slice(b"xx");
        assert!(decode(&frame).is_none());
        assert!(decode(&frame[..10]).is_none());
    }

    #[test]
    fn axes_decode_and_drive_synthetic_dpad() {
        let mut frame = header(3, 1);
        frame.push(b'1');
        frame.extend(axis(12345));
        frame.extend(axis(-32767));
        frame.extend(axis(0));
        frame.push(b'\n');
        assert_eq!(frame.len(), expected_len(3, 1));

        let st = decode(&frame).expect("frame");
        assert!(st.button("b0"));
        let a0 = st.analog("a0").expect("a0");
        assert_eq!(a0.raw, 12345);
        assert!((a0.value - 12345.0 / 32767.0).abs() < 1e-6);
        assert_eq!(st.analog("a1").map(|a| a.value), Some(-1.0));

        // a1 is horizontal, a2 vertical
        assert!(st.button("left"));
        assert!(!st.button("right"));
        assert!(!st.button("up"));
        assert!(!st.button("down"));
    }

    #[test]
    fn single_axis_has_no_dpad() {
        let mut frame = header(1, 0);
        frame.extend(axis(-5));
        frame.push(0);
        let st = decode(&frame).expect("frame");
        assert_eq!(st.analog("a0").map(|a| a.raw), Some(-5));
        assert!(!st.has_button("left"));
    }
}
