//! Byte-per-bit pads: NES, SNES (+ mouse), PS Classic, N64, GameCube.
//!
//! Button `i` is byte `i` of the frame. Analog values that follow the
//! buttons are 8 bytes each, MSB first, tested with the family mask.

use super::bits::{ascii_bit, masked_msb_first, sign_over_axis, sign_over_raw};
use crate::smoothing::MouseSmoother;
use crate::state::{ControllerState, ControllerStateBuilder};

pub type ButtonTable = &'static [Option<&'static str>];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitTest {
    Mask(u8),
    /// pressed iff the byte is not ASCII `'0'`
    Ascii,
}

impl BitTest {
    fn pressed(self, b: u8) -> bool {
        match self {
            BitTest::Mask(m) => b & m != 0,
            BitTest::Ascii => ascii_bit(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// two's complement byte, /128
    Signed,
    /// unsigned byte centered on 128, /128
    Centered,
    /// unsigned byte, /256
    Trigger,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Axis {
    pub name: &'static str,
    pub kind: AxisKind,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Family {
    pub name: &'static str,
    buttons: ButtonTable,
    /// Reduced table used when the frame is exactly `legacy.len()` bytes.
    legacy: Option<ButtonTable>,
    bit: BitTest,
    /// Analog bytes that follow the button block.
    axes: &'static [Axis],
    /// Frame length that carries a mouse report instead of a pad.
    mouse_len: Option<usize>,
}

const NES_LEGACY: ButtonTable = &[
    Some("a"),
    Some("b"),
    Some("select"),
    Some("start"),
    Some("up"),
    Some("down"),
    Some("left"),
    Some("right"),
];

const NES_FULL: ButtonTable = &[
    Some("a"),
    Some("b"),
    Some("select"),
    Some("start"),
    Some("up"),
    Some("down"),
    Some("left"),
    Some("right"),
    Some("p2_a"),
    Some("p2_b"),
    Some("p2_select"),
    Some("p2_start"),
    Some("p2_up"),
    Some("p2_down"),
    Some("p2_left"),
    Some("p2_right"),
];

const SNES_BUTTONS: ButtonTable = &[
    Some("b"),
    Some("y"),
    Some("select"),
    Some("start"),
    Some("up"),
    Some("down"),
    Some("left"),
    Some("right"),
    Some("a"),
    Some("x"),
    Some("l"),
    Some("r"),
    None,
    None,
    None,
    None,
];

const PSCLASSIC_BUTTONS: ButtonTable = &[
    Some("r1"),
    Some("l1"),
    Some("r2"),
    Some("l2"),
    Some("square"),
    Some("x"),
    Some("circle"),
    Some("triangle"),
    None,
    None,
    Some("down"),
    Some("up"),
    Some("right"),
    Some("left"),
    Some("start"),
    Some("select"),
];

const N64_BUTTONS: ButtonTable = &[
    Some("a"),
    Some("b"),
    Some("z"),
    Some("start"),
    Some("up"),
    Some("down"),
    Some("left"),
    Some("right"),
    None,
    None,
    Some("l"),
    Some("r"),
    Some("cup"),
    Some("cdown"),
    Some("cleft"),
    Some("cright"),
];

const GAMECUBE_BUTTONS: ButtonTable = &[
    None,
    None,
    None,
    Some("start"),
    Some("y"),
    Some("x"),
    Some("b"),
    Some("a"),
    None,
    Some("l"),
    Some("r"),
    Some("z"),
    Some("up"),
    Some("down"),
    Some("right"),
    Some("left"),
];

pub const NES: Family = Family {
    name: "nes",
    buttons: NES_FULL,
    legacy: Some(NES_LEGACY),
    bit: BitTest::Mask(0xFF),
    axes: &[],
    mouse_len: None,
};

pub const SNES: Family = Family {
    name: "snes",
    buttons: SNES_BUTTONS,
    legacy: None,
    bit: BitTest::Mask(0xFF),
    axes: &[],
    mouse_len: Some(32),
};

pub const PSCLASSIC: Family = Family {
    name: "psclassic",
    buttons: PSCLASSIC_BUTTONS,
    legacy: None,
    bit: BitTest::Ascii,
    axes: &[],
    mouse_len: None,
};

pub const N64: Family = Family {
    name: "n64",
    buttons: N64_BUTTONS,
    legacy: None,
    bit: BitTest::Mask(0x0F),
    axes: &[
        Axis { name: "stick_x", kind: AxisKind::Signed },
        Axis { name: "stick_y", kind: AxisKind::Signed },
    ],
    mouse_len: None,
};

pub const GAMECUBE: Family = Family {
    name: "gamecube",
    buttons: GAMECUBE_BUTTONS,
    legacy: None,
    bit: BitTest::Mask(0x0F),
    axes: &[
        Axis { name: "lstick_x", kind: AxisKind::Centered },
        Axis { name: "lstick_y", kind: AxisKind::Centered },
        Axis { name: "cstick_x", kind: AxisKind::Centered },
        Axis { name: "cstick_y", kind: AxisKind::Centered },
        Axis { name: "trig_l", kind: AxisKind::Trigger },
        Axis { name: "trig_r", kind: AxisKind::Trigger },
    ],
    mouse_len: None,
};

impl Family {
    pub fn min_len(&self) -> usize {
        self.buttons.len() + self.axes.len() * 8
    }

    pub fn has_mouse(&self) -> bool {
        self.mouse_len.is_some()
    }

    pub fn decode(&self, frame: &[u8], mouse: &mut MouseSmoother) -> Option<ControllerState> {
        if self.mouse_len == Some(frame.len()) {
            return Some(self.decode_mouse(frame, mouse));
        }

        let table = match self.legacy {
            Some(legacy) if frame.len() == legacy.len() => legacy,
            _ => {
                if frame.len() < self.min_len() {
                    return None;
                }
                self.buttons
            }
        };

        let mut state = ControllerStateBuilder::new();
        read_buttons(frame, table, self.bit, &mut state);

        // analogs only ride along with the full table
        if table.len() == self.buttons.len() {
            let mask = match self.bit {
                BitTest::Mask(m) => m,
                BitTest::Ascii => 0xFF,
            };
            for (i, axis) in self.axes.iter().enumerate() {
                let at = self.buttons.len() + i * 8;
                let raw = masked_msb_first(&frame[at..at + 8], mask);
                let value = match axis.kind {
                    AxisKind::Signed => f32::from(raw as i8) / 128.0,
                    AxisKind::Centered => (f32::from(raw) - 128.0) / 128.0,
                    AxisKind::Trigger => f32::from(raw) / 256.0,
                };
                let raw = match axis.kind {
                    AxisKind::Signed => i32::from(raw as i8),
                    _ => i32::from(raw),
                };
                state.set_analog(axis.name, value, raw);
            }
        }

        Some(state.build())
    }

    /// SNES mouse: bits 8/9 are the clicks, 16..24 Y and 24..32 X as
    /// direction bit + 7-bit magnitude.
    fn decode_mouse(&self, frame: &[u8], mouse: &mut MouseSmoother) -> ControllerState {
        let mut state = ControllerStateBuilder::new();
        state
            .set_button("right", self.bit.pressed(frame[8]))
            .set_button("left", self.bit.pressed(frame[9]));

        let y_neg = self.bit.pressed(frame[16]);
        let y_mag = masked_msb_first(&frame[17..24], 0xFF);
        let x_neg = self.bit.pressed(frame[24]);
        let x_mag = masked_msb_first(&frame[25..32], 0xFF);

        let x = sign_over_axis(x_neg, false, x_mag, 127.0);
        let y = sign_over_axis(y_neg, false, y_mag, 127.0);
        mouse.apply(
            x,
            y,
            sign_over_raw(x_neg, x_mag),
            sign_over_raw(y_neg, y_mag),
            &mut state,
        );
        state.build()
    }
}

pub(crate) fn read_buttons(
    frame: &[u8],
    table: ButtonTable,
    bit: BitTest,
    out: &mut ControllerStateBuilder,
) {
    for (name, &b) in table.iter().zip(frame) {
        if let Some(name) = name {
            out.set_button(name, bit.pressed(b));
        }
    }
}
