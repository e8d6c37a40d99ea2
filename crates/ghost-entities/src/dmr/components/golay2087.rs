//! Golay (20,8) code protecting the slot type field.
//!
//! Systematic shortened Golay (23,12) code extended with an overall parity
//! bit, giving a minimum distance of 8. Codeword layout (20 bits, MSB first):
//! bits 19..12 data, bits 11..1 check bits, bit 0 overall parity.

/// Generator polynomial of the Golay (23,12) code, x^11 + x^10 + x^6 + x^5 + x^4 + x^2 + 1
pub const GOLAY_GEN_POLY: u32 = 0xc75;
pub const GOLAY2087_BITS: usize = 20;
pub const GOLAY2087_MASK: u32 = (1 << GOLAY2087_BITS) - 1;
/// Largest number of bit errors that is corrected
pub const GOLAY2087_MAX_CORRECTABLE: usize = 3;

const fn check_bits(data: u8) -> u32 {
    let mut rem = (data as u32) << 11;
    let mut i = 18;
    while i >= 11 {
        if (rem >> i) & 1 == 1 {
            rem ^= GOLAY_GEN_POLY << (i - 11);
        }
        i -= 1;
    }
    rem
}

const fn compute_codeword(data: u8) -> u32 {
    let cw = ((data as u32) << 11) | check_bits(data);
    (cw << 1) | (cw.count_ones() & 1)
}

const fn compute_encode_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = compute_codeword(i as u8);
        i += 1;
    }
    table
}

pub static GOLAY2087_ENCODE_TABLE: [u32; 256] = compute_encode_table();

pub fn encode(data: u8) -> u32 {
    GOLAY2087_ENCODE_TABLE[data as usize]
}

/// Decodes a received 20-bit word. Returns the data byte and the number of
/// corrected bit errors, or None if no codeword lies within 3 bit flips.
pub fn decode(word: u32) -> Option<(u8, usize)> {
    let word = word & GOLAY2087_MASK;
    let guess = (word >> 12) as u8;
    if GOLAY2087_ENCODE_TABLE[guess as usize] == word {
        return Some((guess, 0));
    }

    // Minimum distance 8 makes the nearest codeword unique within this radius
    GOLAY2087_ENCODE_TABLE
        .iter()
        .enumerate()
        .map(|(data, &cw)| (data as u8, (cw ^ word).count_ones() as usize))
        .find(|&(_, dist)| dist <= GOLAY2087_MAX_CORRECTABLE)
}
