//! MSB-first bit helpers shared by the FEC codecs

/// Returns bit `bit` of `input`, counting from the MSB of byte 0
#[inline]
pub fn get_nth_bit(input: &[u8], bit: usize) -> bool {
    let byte = bit / 8;
    let bit_in_byte = 7 - (bit % 8);
    (input[byte] >> bit_in_byte) & 1 == 1
}

/// Unpacks the first `out.len()` bits of `input` into `out`, MSB first.
/// Panics if `input` holds fewer bits than requested.
pub fn bytes_to_bits(input: &[u8], out: &mut [bool]) {
    assert!(input.len() * 8 >= out.len());
    for (i, bit) in out.iter_mut().enumerate() {
        *bit = get_nth_bit(input, i);
    }
}

/// Packs `bits` into `out`, MSB first. Trailing bits of the last byte are zero.
pub fn bits_to_bytes(bits: &[bool], out: &mut [u8]) {
    assert!(out.len() * 8 >= bits.len());
    out.fill(0);
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            out[i / 8] |= 1 << (7 - (i % 8));
        }
    }
}

/// Reads a 24-bit big-endian value, as used for DMR identities
#[inline]
pub fn read_u24_be(input: &[u8]) -> u32 {
    (input[0] as u32) << 16 | (input[1] as u32) << 8 | input[2] as u32
}

/// Writes the low 24 bits of `value` big-endian into `out[0..3]`
#[inline]
pub fn write_u24_be(value: u32, out: &mut [u8]) {
    out[0] = (value >> 16) as u8;
    out[1] = (value >> 8) as u8;
    out[2] = value as u8;
}
