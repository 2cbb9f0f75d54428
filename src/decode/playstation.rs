//! PlayStation family, selected by the controller ID in the header.
//!
//! ```text
//! [id: 8 ASCII bits][buttons: 16][trailing bytes: 8 ASCII bits each]
//! ```
//! Bytes travel LSB first, as on the controller's serial link.

use super::bits::{ascii_bit, ascii_byte, sign_over_axis, sign_over_raw};
use super::serial::{BitTest, ButtonTable, read_buttons};
use crate::smoothing::MouseSmoother;
use crate::state::{ControllerState, ControllerStateBuilder};

const HEADER_LEN: usize = 8;
const BUTTON_LEN: usize = 16;
const BODY: usize = HEADER_LEN + BUTTON_LEN;

pub const ID_DIGITAL: u8 = 0x41;
pub const ID_ANALOG: u8 = 0x73;
pub const ID_ANALOG_RED: u8 = 0x53;
pub const ID_DUALSHOCK2: u8 = 0x79;
pub const ID_NEGCON: u8 = 0x23;
pub const ID_MOUSE: u8 = 0x12;

const DIGITAL_BUTTONS: ButtonTable = &[
    Some("select"),
    None,
    None,
    Some("start"),
    Some("up"),
    Some("right"),
    Some("down"),
    Some("left"),
    Some("l2"),
    Some("r2"),
    Some("l1"),
    Some("r1"),
    Some("triangle"),
    Some("circle"),
    Some("x"),
    Some("square"),
];

const ANALOG_BUTTONS: ButtonTable = &[
    Some("select"),
    Some("l3"),
    Some("r3"),
    Some("start"),
    Some("up"),
    Some("right"),
    Some("down"),
    Some("left"),
    Some("l2"),
    Some("r2"),
    Some("l1"),
    Some("r1"),
    Some("triangle"),
    Some("circle"),
    Some("x"),
    Some("square"),
];

const NEGCON_BUTTONS: ButtonTable = &[
    None,
    None,
    None,
    Some("start"),
    Some("up"),
    Some("right"),
    Some("down"),
    Some("left"),
    None,
    None,
    None,
    Some("r"),
    Some("b"),
    Some("a"),
    None,
    None,
];

const MOUSE_BUTTONS: ButtonTable = &[
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some("right"),
    Some("left"),
    None,
    None,
    None,
    None,
];

const STICKS: [&str; 4] = ["rstick_x", "rstick_y", "lstick_x", "lstick_y"];

const PRESSURES: [&str; 12] = [
    "analog_right",
    "analog_left",
    "analog_up",
    "analog_down",
    "analog_triangle",
    "analog_circle",
    "analog_x",
    "analog_square",
    "analog_l1",
    "analog_r1",
    "analog_l2",
    "analog_r2",
];

/// Mouse block: four flag bytes then two 8-bit magnitudes.
const MOUSE_TRAILER: usize = 4 + 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Digital,
    Analog,
    DualShock2,
    NegCon,
    Mouse,
}

impl Mode {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            ID_DIGITAL => Some(Mode::Digital),
            ID_ANALOG | ID_ANALOG_RED => Some(Mode::Analog),
            ID_DUALSHOCK2 => Some(Mode::DualShock2),
            ID_NEGCON => Some(Mode::NegCon),
            ID_MOUSE => Some(Mode::Mouse),
            _ => None,
        }
    }

    fn buttons(self) -> ButtonTable {
        match self {
            Mode::Digital => DIGITAL_BUTTONS,
            Mode::Analog | Mode::DualShock2 => ANALOG_BUTTONS,
            Mode::NegCon => NEGCON_BUTTONS,
            Mode::Mouse => MOUSE_BUTTONS,
        }
    }

    /// Minimum frame length for this sub-protocol.
    pub fn frame_len(self) -> usize {
        BODY + match self {
            Mode::Digital => 0,
            Mode::Analog => STICKS.len() * 8,
            Mode::DualShock2 => (STICKS.len() + PRESSURES.len()) * 8,
            Mode::NegCon => 4 * 8,
            Mode::Mouse => MOUSE_TRAILER,
        }
    }
}

fn trailing_byte(frame: &[u8], index: usize) -> u8 {
    let at = BODY + index * 8;
    ascii_byte(&frame[at..at + 8])
}

pub fn decode(frame: &[u8], mouse: &mut MouseSmoother) -> Option<ControllerState> {
    if frame.len() < HEADER_LEN {
        return None;
    }
    let mode = Mode::from_id(ascii_byte(&frame[..HEADER_LEN]))?;
    if frame.len() < mode.frame_len() {
        return None;
    }

    let mut state = ControllerStateBuilder::new();
    read_buttons(&frame[HEADER_LEN..BODY], mode.buttons(), BitTest::Ascii, &mut state);

    match mode {
        Mode::Digital => {}
        Mode::Analog | Mode::DualShock2 => {
            for (i, name) in STICKS.iter().enumerate() {
                let raw = trailing_byte(frame, i);
                state.set_analog(name, (f32::from(raw) - 128.0) / 128.0, i32::from(raw));
            }
            if mode == Mode::DualShock2 {
                for (i, name) in PRESSURES.iter().enumerate() {
                    let raw = trailing_byte(frame, STICKS.len() + i);
                    state.set_analog(name, f32::from(raw) / 256.0, i32::from(raw));
                }
            }
        }
        Mode::NegCon => {
            let steering = trailing_byte(frame, 0);
            state.set_analog(
                "steering",
                f32::from(u8::MAX - steering) / 256.0,
                i32::from(steering),
            );
            for (i, name) in ["analog_i", "analog_ii", "analog_l"].iter().enumerate() {
                let raw = trailing_byte(frame, 1 + i);
                state.set_analog(name, f32::from(raw) / 256.0, i32::from(raw));
            }
        }
        Mode::Mouse => {
            let flags = &frame[BODY..BODY + 4];
            let (x_neg, x_over) = (ascii_bit(flags[0]), ascii_bit(flags[1]));
            let (y_neg, y_over) = (ascii_bit(flags[2]), ascii_bit(flags[3]));
            let x_mag = ascii_byte(&frame[BODY + 4..BODY + 12]);
            let y_mag = ascii_byte(&frame[BODY + 12..BODY + 20]);
            mouse.apply(
                sign_over_axis(x_neg, x_over, x_mag, 127.0),
                sign_over_axis(y_neg, y_over, y_mag, 127.0),
                sign_over_raw(x_neg, x_mag),
                sign_over_raw(y_neg, y_mag),
                &mut state,
            );
        }
    }

    Some(state.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(v: u8) -> Vec<u8> {
        (0..8)
            .map(|i| if v & (1 << i) != 0 { b'1' } else { b'0' })
            .collect()
    }

    fn frame(id: u8, pressed: &[usize], trailing: &[u8]) -> Vec<u8> {
        let mut out = bits(id);
        let mut buttons = vec![b'0'; BUTTON_LEN];
        for &i in pressed {
            buttons[i] = b'1';
        }
        out.extend(buttons);
        for &b in trailing {
            out.extend(bits(b));
        }
        out
    }

    fn run(f: &[u8]) -> Option<ControllerState> {
        decode(f, &mut MouseSmoother::default())
    }

    #[test]
    fn digital_pad() {
        let st = run(&frame(ID_DIGITAL, &[0, 14], &[])).expect("digital");
        assert!(st.button("select"));
        assert!(st.button("x"));
        assert!(!st.button("start"));
        assert!(!st.has_button("l3"));
        assert!(st.analog_names().is_empty());
    }

    #[test]
    fn header_is_read_lsb_first() {
        let mut f = b"10000010".to_vec();
        f.extend([b'0'; BUTTON_LEN]);
        let st = run(&f).expect("0x41 digital");
        assert!(!st.button("start"));

        let mut f = b"11001110".to_vec();
        f.extend([b'0'; BUTTON_LEN]);
        // rstick_x = 0x80, the rest zero
        f.extend(b"00000001");
        f.extend([b'0'; 24]);
        let st = run(&f).expect("0x73 analog");
        assert_eq!(st.analog("rstick_x").map(|a| a.raw), Some(128));
        assert_eq!(st.analog("lstick_y").map(|a| a.raw), Some(0));
    }

    #[test]
    fn every_mode_rejects_a_short_frame() {
        for mode in [Mode::Digital, Mode::Analog, Mode::DualShock2, Mode::NegCon, Mode::Mouse] {
            let id = match mode {
                Mode::Digital => ID_DIGITAL,
                Mode::Analog => ID_ANALOG,
                Mode::DualShock2 => ID_DUALSHOCK2,
                Mode::NegCon => ID_NEGCON,
                Mode::Mouse => ID_MOUSE,
            };
            let mut f = bits(id);
            f.resize(mode.frame_len(), b'0');
            assert!(run(&f).is_some(), "{mode:?} full length");
            f.pop();
            assert!(run(&f).is_none(), "{mode:?} one byte short");
        }
    }

    #[test]
    fn unknown_id_is_unrecognized() {
        assert!(run(&frame(0x42, &[], &[0; 16])).is_none());
        assert!(run(b"0100").is_none());
    }

    #[test]
    fn analog_sticks_center_on_128() {
        let st = run(&frame(ID_ANALOG, &[1], &[128, 0, 255, 192])).expect("analog");
        assert!(st.button("l3"));
        assert_eq!(st.analog("rstick_x").map(|a| a.value), Some(0.0));
        assert_eq!(st.analog("rstick_y").map(|a| a.value), Some(-1.0));
        assert_eq!(st.analog("lstick_y").map(|a| a.value), Some(0.5));
        assert_eq!(st.analog("lstick_x").map(|a| a.raw), Some(255));
        assert!(st.analog("analog_x").is_none());
    }

    #[test]
    fn red_mode_id_is_analog() {
        assert!(run(&frame(ID_ANALOG_RED, &[], &[128; 4])).is_some());
    }

    #[test]
    fn analog_needs_its_trailing_bytes() {
        let f = frame(ID_ANALOG, &[], &[128, 128, 128]);
        assert!(run(&f).is_none());
    }

    #[test]
    fn dualshock2_pressures() {
        let mut trailing = vec![128u8; 4];
        trailing.extend([0u8; 12]);
        trailing[4 + 6] = 128;
        let f = frame(ID_DUALSHOCK2, &[], &trailing);
        assert_eq!(f.len(), 152);
        let st = run(&f).expect("ds2");
        assert_eq!(st.analog("analog_x").map(|a| a.value), Some(0.5));
        assert_eq!(st.analog("analog_r2").map(|a| a.value), Some(0.0));
    }

    #[test]
    fn negcon_steering_is_inverted() {
        let st = run(&frame(ID_NEGCON, &[13], &[255, 128, 0, 64])).expect("negcon");
        assert!(st.button("a"));
        let steering = st.analog("steering").expect("steering");
        assert_eq!(steering.value, 0.0);
        assert_eq!(steering.raw, 255);
        assert_eq!(st.analog("analog_i").map(|a| a.value), Some(0.5));
        assert_eq!(st.analog("analog_l").map(|a| a.value), Some(0.25));
    }

    #[test]
    fn mouse_overflow_pins_axis() {
        let mut f = frame(ID_MOUSE, &[11], &[]);
        // x negative with overflow, y positive magnitude 127
        f.extend(b"1100");
        f.extend(bits(3));
        f.extend(bits(127));
        assert_eq!(f.len(), Mode::Mouse.frame_len());

        let mut sm = MouseSmoother::new(2.0);
        let mut st = None;
        for _ in 0..3 {
            st = decode(&f, &mut sm);
        }
        let st = st.expect("mouse");
        assert!(st.button("left"));
        assert_eq!(st.analog("mouse_magnitude_x").map(|a| a.value), Some(-1.0));
        assert_eq!(st.analog("mouse_magnitude_y").map(|a| a.value), Some(1.0));
        assert_eq!(st.analog("mouse_magnitude_x").map(|a| a.raw), Some(-3));
    }
}
