//! BPTC(196,96) block decoder for CSBK and other full-rate control blocks
//!
//! Decoding is a chain of pure transforms over a 196-bit working buffer:
//! bit extraction, deinterleaving, per-group single-bit correction and
//! finally packing of the first 96 bits into a 12-byte payload.

use ghost_core::bits;

use crate::dmr::dmr_err::DmrErr;

pub const BPTC_BLOCK_BYTES: usize = 33;
pub const BPTC_BITS: usize = 196;
pub const BPTC_PAYLOAD_BITS: usize = 96;
pub const BPTC_PAYLOAD_BYTES: usize = 12;

/// Interleave step. Coprime with 196, so `i * 181 mod 196` is a permutation.
pub const INTERLEAVE_STEP: usize = 181;

/// A full burst carries 98 info bits, the slot type and sync field, then 98 more info bits
const BURST_BITS: usize = BPTC_BLOCK_BYTES * 8;
const BURST_HALF_BITS: usize = 98;
const BURST_SECOND_HALF: usize = BURST_BITS - BURST_HALF_BITS;

const GROUP_BITS: usize = 8;
const PARITY_POSITIONS: [usize; 4] = [0, 1, 3, 7];

/// Outcome of the correction pass over all 8-bit groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionStats {
    pub clean: usize,
    pub corrected: usize,
    pub uncorrectable: usize,
}

/// Unpacks the 196 data-bearing bits of a block, MSB first. Padding bits of the last byte are ignored.
pub fn extract_bits(block: &[u8; BPTC_BLOCK_BYTES]) -> [bool; BPTC_BITS] {
    let mut out = [false; BPTC_BITS];
    bits::bytes_to_bits(block, &mut out);
    out
}

#[inline]
const fn interleave_pos(i: usize) -> usize {
    (i * INTERLEAVE_STEP) % BPTC_BITS
}

pub fn deinterleave(input: &[bool; BPTC_BITS]) -> [bool; BPTC_BITS] {
    let mut out = [false; BPTC_BITS];
    for (i, bit) in out.iter_mut().enumerate() {
        *bit = input[interleave_pos(i)];
    }
    out
}

/// Inverse of [`deinterleave`]
pub fn interleave(input: &[bool; BPTC_BITS]) -> [bool; BPTC_BITS] {
    let mut out = [false; BPTC_BITS];
    for (i, &bit) in input.iter().enumerate() {
        out[interleave_pos(i)] = bit;
    }
    out
}

/// Weighted error position of one 8-bit group: the sum of `p + 1` over all
/// parity positions `p` whose stored bit disagrees with the parity of the
/// bits it covers. Zero means the group is consistent.
pub fn group_syndrome(group: &[bool]) -> usize {
    let mut syndrome = 0;
    for &p in PARITY_POSITIONS.iter() {
        let mut parity = false;
        for (j, &bit) in group.iter().enumerate() {
            if j != p && ((j + 1) & (p + 1)) != 0 {
                parity ^= bit;
            }
        }
        if parity != group[p] {
            syndrome += p + 1;
        }
    }
    syndrome
}

/// Corrects at most one bit per 8-bit group in place. Groups whose syndrome
/// points outside the group are left as received.
pub fn correct_errors(bits: &mut [bool; BPTC_BITS]) -> CorrectionStats {
    let mut stats = CorrectionStats::default();
    for group in bits.chunks_exact_mut(GROUP_BITS) {
        match group_syndrome(group) {
            0 => stats.clean += 1,
            s @ 1..=GROUP_BITS => {
                group[s - 1] = !group[s - 1];
                stats.corrected += 1;
            }
            _ => stats.uncorrectable += 1,
        }
    }
    stats
}

pub fn extract_payload(bits: &[bool; BPTC_BITS]) -> [u8; BPTC_PAYLOAD_BYTES] {
    let mut out = [0u8; BPTC_PAYLOAD_BYTES];
    bits::bits_to_bytes(&bits[..BPTC_PAYLOAD_BITS], &mut out);
    out
}

/// Decodes a 33-byte block into its 12-byte payload
pub fn decode(block: &[u8]) -> Result<[u8; BPTC_PAYLOAD_BYTES], DmrErr> {
    let block: &[u8; BPTC_BLOCK_BYTES] = block
        .try_into()
        .map_err(|_| DmrErr::InvalidLength { expected: BPTC_BLOCK_BYTES, found: block.len() })?;

    let raw = extract_bits(block);
    let mut bits = deinterleave(&raw);
    let stats = correct_errors(&mut bits);
    if stats.uncorrectable > 0 {
        tracing::debug!("bptc: {} groups uncorrectable, {} corrected", stats.uncorrectable, stats.corrected);
    } else if stats.corrected > 0 {
        tracing::trace!("bptc: corrected {} groups", stats.corrected);
    }
    Ok(extract_payload(&bits))
}

/// Places `payload` in the first 96 bit positions, zeroes the rest and
/// interleaves. Used to build synthetic blocks; no parity is generated.
pub fn interleave_payload(payload: &[u8; BPTC_PAYLOAD_BYTES]) -> [u8; BPTC_BLOCK_BYTES] {
    let mut bits = [false; BPTC_BITS];
    bits::bytes_to_bits(payload, &mut bits[..BPTC_PAYLOAD_BITS]);
    let interleaved = interleave(&bits);
    let mut out = [0u8; BPTC_BLOCK_BYTES];
    bits::bits_to_bytes(&interleaved, &mut out);
    out
}

fn burst_bits(burst: &[u8]) -> Result<[bool; BURST_BITS], DmrErr> {
    if burst.len() != BPTC_BLOCK_BYTES {
        return Err(DmrErr::InvalidLength { expected: BPTC_BLOCK_BYTES, found: burst.len() });
    }
    let mut all = [false; BURST_BITS];
    bits::bytes_to_bits(burst, &mut all);
    Ok(all)
}

/// Gathers the 196 coded bits of a full 33-byte burst, skipping the slot type and sync field
pub fn extract_burst_block(burst: &[u8]) -> Result<[u8; BPTC_BLOCK_BYTES], DmrErr> {
    let all = burst_bits(burst)?;
    let mut info = [false; BPTC_BITS];
    info[..BURST_HALF_BITS].copy_from_slice(&all[..BURST_HALF_BITS]);
    info[BURST_HALF_BITS..].copy_from_slice(&all[BURST_SECOND_HALF..]);

    let mut out = [0u8; BPTC_BLOCK_BYTES];
    bits::bits_to_bytes(&info, &mut out);
    Ok(out)
}

/// Inverse of [`extract_burst_block`]. Slot type and sync bits of `burst` are kept.
pub fn insert_burst_block(block: &[u8; BPTC_BLOCK_BYTES], burst: &mut [u8]) -> Result<(), DmrErr> {
    let mut all = burst_bits(burst)?;
    let info = extract_bits(block);
    all[..BURST_HALF_BITS].copy_from_slice(&info[..BURST_HALF_BITS]);
    all[BURST_SECOND_HALF..].copy_from_slice(&info[BURST_HALF_BITS..]);
    bits::bits_to_bytes(&all, burst);
    Ok(())
}

/// Decodes the BPTC block carried in a full data or LC burst
pub fn decode_burst(burst: &[u8]) -> Result<[u8; BPTC_PAYLOAD_BYTES], DmrErr> {
    decode(&extract_burst_block(burst)?)
}
