//! Game Boy Printer capture lines.
//!
//! The adapter forwards each link-cable packet as whitespace separated hex
//! pairs. A packet starts with the sync bytes `88 33`, followed by command,
//! compression flag and a little-endian data length. The decoded packet is
//! handed on as the auxiliary payload; there are no buttons.

use crate::state::{ControllerState, ControllerStateBuilder};

pub const SYNC: [u8; 2] = [0x88, 0x33];
const HEADER_LEN: usize = 6;

fn parse_hex(frame: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(frame).ok()?;
    text.split_ascii_whitespace()
        .map(|tok| {
            if tok.len() == 2 {
                u8::from_str_radix(tok, 16).ok()
            } else {
                None
            }
        })
        .collect()
}

pub fn decode(frame: &[u8]) -> Option<ControllerState> {
    let packet = parse_hex(frame)?;
    if packet.len() < HEADER_LEN || packet[..2] != SYNC {
        return None;
    }
    let command = packet[2];
    let data_len = usize::from(u16::from_le_bytes([packet[4], packet[5]]));
    if packet.len() < HEADER_LEN + data_len {
        return None;
    }

    let mut state = ControllerStateBuilder::new();
    state
        .set_analog("printer_command", f32::from(command), i32::from(command))
        .set_analog("printer_data_len", data_len as f32, data_len as i32)
        .set_aux(packet);
    Some(state.build())
}
