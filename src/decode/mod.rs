//! Wire-format decoders, one variant per hardware family.
//!
//! A decoder turns one delimited frame into a [`ControllerState`], or `None`
//! when the frame does not match the format (wrong length, unknown ID, bad
//! sync). Decoding never fails harder than that.

pub mod bits;
pub mod genesis;
pub mod mister;
pub mod playstation;
pub mod printer;
pub mod serial;

use crate::error::{Result, RetroviewError};
use crate::smoothing::MouseSmoother;
use crate::state::ControllerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Byte-per-bit pads sharing one table-driven reader.
    Serial(&'static serial::Family),
    Mister,
    PlayStation,
    Genesis,
    Printer,
}

impl Decoder {
    pub const ALL: &'static [Decoder] = &[
        Decoder::Serial(&serial::NES),
        Decoder::Serial(&serial::SNES),
        Decoder::Serial(&serial::PSCLASSIC),
        Decoder::Serial(&serial::N64),
        Decoder::Serial(&serial::GAMECUBE),
        Decoder::Mister,
        Decoder::PlayStation,
        Decoder::Genesis,
        Decoder::Printer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Decoder::Serial(f) => f.name,
            Decoder::Mister => "mister",
            Decoder::PlayStation => "playstation",
            Decoder::Genesis => "genesis",
            Decoder::Printer => "printer",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| RetroviewError::UnknownFormat(name.to_string()))
    }

    /// True for formats that can emit mouse reports.
    pub fn uses_smoothing(&self) -> bool {
        match self {
            Decoder::Serial(f) => f.has_mouse(),
            Decoder::PlayStation | Decoder::Genesis => true,
            Decoder::Mister | Decoder::Printer => false,
        }
    }

    /// Decode one frame. `mouse` is the smoothing context of this source;
    /// formats without a mouse report leave it untouched.
    pub fn decode(&self, frame: &[u8], mouse: &mut MouseSmoother) -> Option<ControllerState> {
        match self {
            Decoder::Serial(f) => f.decode(frame, mouse),
            Decoder::Mister => mister::decode(frame),
            Decoder::PlayStation => playstation::decode(frame, mouse),
            Decoder::Genesis => genesis::decode(frame, mouse),
            Decoder::Printer => printer::decode(frame),
        }
    }
}
