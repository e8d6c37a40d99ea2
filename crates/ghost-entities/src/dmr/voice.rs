//! Voice burst layout: two halves of vocoder bits around a 48-bit field
//! that carries either the voice sync pattern or embedded signalling

use ghost_core::bits;

use crate::dmr::dmr_err::DmrErr;

pub const VOICE_BURST_BYTES: usize = 33;
/// Three vocoder frames of 72 bits
pub const VOICE_PAYLOAD_BYTES: usize = 27;
pub const EMBEDDED_FIELD_BYTES: usize = 6;

const BURST_BITS: usize = VOICE_BURST_BYTES * 8;
const VOICE_HALF_BITS: usize = 108;
const EMBEDDED_BITS: usize = EMBEDDED_FIELD_BYTES * 8;

/// Burst A of a superframe carries sync, bursts B..F embedded signalling
pub const VOICE_SYNC_SEQ: u8 = 0;
pub const VOICE_LAST_SEQ: u8 = 5;

/// Splits a voice burst into its vocoder payload and the middle field
pub fn split_burst(burst: &[u8]) -> Result<([u8; VOICE_PAYLOAD_BYTES], [u8; EMBEDDED_FIELD_BYTES]), DmrErr> {
    if burst.len() != VOICE_BURST_BYTES {
        return Err(DmrErr::InvalidLength { expected: VOICE_BURST_BYTES, found: burst.len() });
    }
    let mut all = [false; BURST_BITS];
    bits::bytes_to_bits(burst, &mut all);

    let mut voice_bits = [false; VOICE_PAYLOAD_BYTES * 8];
    voice_bits[..VOICE_HALF_BITS].copy_from_slice(&all[..VOICE_HALF_BITS]);
    voice_bits[VOICE_HALF_BITS..].copy_from_slice(&all[VOICE_HALF_BITS + EMBEDDED_BITS..]);

    let mut voice = [0u8; VOICE_PAYLOAD_BYTES];
    let mut embedded = [0u8; EMBEDDED_FIELD_BYTES];
    bits::bits_to_bytes(&voice_bits, &mut voice);
    bits::bits_to_bytes(&all[VOICE_HALF_BITS..VOICE_HALF_BITS + EMBEDDED_BITS], &mut embedded);
    Ok((voice, embedded))
}

/// Inverse of [`split_burst`]
pub fn build_burst(voice: &[u8; VOICE_PAYLOAD_BYTES], embedded: &[u8; EMBEDDED_FIELD_BYTES]) -> [u8; VOICE_BURST_BYTES] {
    let mut voice_bits = [false; VOICE_PAYLOAD_BYTES * 8];
    let mut embedded_bits = [false; EMBEDDED_BITS];
    bits::bytes_to_bits(voice, &mut voice_bits);
    bits::bytes_to_bits(embedded, &mut embedded_bits);

    let mut all = [false; BURST_BITS];
    all[..VOICE_HALF_BITS].copy_from_slice(&voice_bits[..VOICE_HALF_BITS]);
    all[VOICE_HALF_BITS..VOICE_HALF_BITS + EMBEDDED_BITS].copy_from_slice(&embedded_bits);
    all[VOICE_HALF_BITS + EMBEDDED_BITS..].copy_from_slice(&voice_bits[VOICE_HALF_BITS..]);

    let mut out = [0u8; VOICE_BURST_BYTES];
    bits::bits_to_bytes(&all, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_field_position() {
        let mut burst = [0u8; VOICE_BURST_BYTES];
        // Bits 108..156: low nibble of byte 13 through the high nibble of byte 19
        burst[13] = 0x0f;
        burst[14..19].fill(0xff);
        burst[19] = 0xf0;
        let (voice, embedded) = split_burst(&burst).unwrap();
        assert_eq!(voice, [0u8; VOICE_PAYLOAD_BYTES]);
        assert_eq!(embedded, [0xff; EMBEDDED_FIELD_BYTES]);
    }

    #[test]
    fn test_build_and_split() {
        let mut voice = [0u8; VOICE_PAYLOAD_BYTES];
        for (i, b) in voice.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37) ^ 0x5a;
        }
        let embedded = [0x13, 0x57, 0x9b, 0xdf, 0x02, 0x46];
        let burst = build_burst(&voice, &embedded);
        assert_eq!(split_burst(&burst).unwrap(), (voice, embedded));
        assert!(split_burst(&burst[..30]).is_err());
    }
}
