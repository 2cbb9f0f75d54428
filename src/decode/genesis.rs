//! Genesis / Mega Drive: 13-byte pad frames or 24-byte mouse frames.

use super::bits::masked_lsb_first;
use super::serial::{BitTest, ButtonTable, read_buttons};
use crate::smoothing::MouseSmoother;
use crate::state::{ControllerState, ControllerStateBuilder};

pub const PAD_LEN: usize = 13;
pub const MOUSE_LEN: usize = 24;

const PAD_BUTTONS: ButtonTable = &[
    Some("up"),
    Some("down"),
    Some("left"),
    Some("right"),
    Some("b"),
    Some("c"),
    Some("a"),
    Some("start"),
    Some("z"),
    Some("y"),
    Some("x"),
    Some("mode"),
    None,
];

// flags nibble then button nibble
const MOUSE_BUTTONS: ButtonTable = &[
    None,
    None,
    None,
    None,
    Some("start"),
    Some("middle"),
    Some("right"),
    Some("left"),
];

const BIT: BitTest = BitTest::Mask(0xFF);

pub fn decode(frame: &[u8], mouse: &mut MouseSmoother) -> Option<ControllerState> {
    let mut state = ControllerStateBuilder::new();
    match frame.len() {
        PAD_LEN => read_buttons(frame, PAD_BUTTONS, BIT, &mut state),
        MOUSE_LEN => {
            read_buttons(frame, MOUSE_BUTTONS, BIT, &mut state);
            let y_over = frame[0] != 0;
            let x_over = frame[1] != 0;
            let y_neg = frame[2] != 0;
            let x_neg = frame[3] != 0;
            // magnitudes arrive LSB first
            let x_mag = masked_lsb_first(&frame[8..16], 0xFF);
            let y_mag = masked_lsb_first(&frame[16..24], 0xFF);

            let (x, x_raw) = axis(x_neg, x_over, x_mag);
            let (y, y_raw) = axis(y_neg, y_over, y_mag);
            mouse.apply(x, y, x_raw, y_raw, &mut state);
        }
        _ => return None,
    }
    Some(state.build())
}

/// Sign bit + 8-bit magnitude form a 9-bit two's complement delta.
fn axis(negative: bool, over: bool, magnitude: u8) -> (f32, i32) {
    let raw = if negative {
        i32::from(magnitude) - 256
    } else {
        i32::from(magnitude)
    };
    let value = if over {
        if negative { -1.0 } else { 1.0 }
    } else {
        (raw as f32 / 255.0).clamp(-1.0, 1.0)
    };
    (value, raw)
}
