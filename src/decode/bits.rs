//! Helpers for the one-byte-per-bit wire encodings.
//!
//! The adapters never send packed bits: every bit of a value travels as its
//! own byte, either raw (`0x00` / non-zero under a mask) or as ASCII where
//! `'0'` is the only "clear" value.

pub const ASCII_ZERO: u8 = b'0';

#[inline]
pub fn ascii_bit(b: u8) -> bool {
    b != ASCII_ZERO
}

/// Pack `n` ASCII bit-bytes, byte `i` becoming bit `i` (LSB first).
pub fn ascii_lsb_first(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(32)
        .enumerate()
        .fold(0u32, |acc, (i, &b)| if ascii_bit(b) { acc | (1 << i) } else { acc })
}

/// One byte from 8 ASCII bit-bytes, LSB first like the wire.
pub fn ascii_byte(bytes: &[u8]) -> u8 {
    ascii_lsb_first(&bytes[..bytes.len().min(8)]) as u8
}

/// Pack 8 masked bit-bytes, the first byte becoming the MSB.
pub fn masked_msb_first(bytes: &[u8], mask: u8) -> u8 {
    bytes
        .iter()
        .take(8)
        .fold(0u8, |acc, &b| (acc << 1) | u8::from(b & mask != 0))
}

/// Pack 8 masked bit-bytes, the first byte becoming the LSB.
pub fn masked_lsb_first(bytes: &[u8], mask: u8) -> u8 {
    bytes
        .iter()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (i, &b)| if b & mask != 0 { acc | (1 << i) } else { acc })
}

/// Mouse delta carried as direction sign + overflow flag + magnitude.
/// Overflow pins the axis to the edge; otherwise the magnitude scales
/// linearly and saturates at ±1.
pub fn sign_over_axis(negative: bool, over: bool, magnitude: u8, scale: f32) -> f32 {
    let sign = if negative { -1.0 } else { 1.0 };
    if over {
        sign
    } else {
        (sign * f32::from(magnitude) / scale).clamp(-1.0, 1.0)
    }
}

/// Raw integer that goes alongside a sign/magnitude mouse value.
pub fn sign_over_raw(negative: bool, magnitude: u8) -> i32 {
    if negative {
        -i32::from(magnitude)
    } else {
        i32::from(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_lsb_first_packs_by_position() {
        assert_eq!(ascii_lsb_first(b"10000000"), 1);
        assert_eq!(ascii_lsb_first(b"01000000"), 2);
        assert_eq!(ascii_lsb_first(b"11100000"), 7);
        // anything that is not '0' is a set bit
        assert_eq!(ascii_lsb_first(&[0x00, b'0', b'1']), 0b101);
    }

    #[test]
    fn ascii_lsb_first_full_width_is_signed_when_cast() {
        let all = [b'1'; 32];
        assert_eq!(ascii_lsb_first(&all) as i32, -1);
    }

    #[test]
    fn ascii_byte_is_lsb_first_and_eight_wide() {
        assert_eq!(ascii_byte(b"10000010"), 0x41);
        assert_eq!(ascii_byte(b"10011110"), 0x79);
        assert_eq!(ascii_byte(b"111111111"), 0xFF);
    }

    #[test]
    fn masked_packing_directions() {
        let bits = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10];
        assert_eq!(masked_msb_first(&bits, 0x0F), 0b1000_0000);
        assert_eq!(masked_msb_first(&bits, 0xFF), 0b1000_0001);
        assert_eq!(masked_lsb_first(&bits, 0xFF), 0b1000_0001);
        assert_eq!(masked_lsb_first(&bits[..2], 0xFF), 0b1);
    }

    #[test]
    fn sign_over_axis_edges() {
        assert_eq!(sign_over_axis(false, true, 3, 127.0), 1.0);
        assert_eq!(sign_over_axis(true, true, 3, 127.0), -1.0);
        assert_eq!(sign_over_axis(true, false, 127, 127.0), -1.0);
        assert_eq!(sign_over_axis(false, false, 255, 127.0), 1.0);
        assert_eq!(sign_over_axis(false, false, 0, 127.0), 0.0);
        assert_eq!(sign_over_raw(true, 5), -5);
    }
}
