//! Reed-Solomon (12,9) over GF(256), as used for the full link control checksum.
//! Parity is emitted and checked most significant register slot first.

use crate::dmr::dmr_err::DmrErr;

pub const RS129_DATA_BYTES: usize = 9;
pub const RS129_PARITY_BYTES: usize = 3;
pub const RS129_BLOCK_BYTES: usize = RS129_DATA_BYTES + RS129_PARITY_BYTES;

/// Generator coefficients g0..g2 of (x + a)(x + a^2)(x + a^3), a = 2
const POLY: [u8; RS129_PARITY_BYTES] = [64, 56, 14];

/// GF(256) multiply, reduction polynomial x^8 + x^4 + x^3 + x^2 + 1
pub const fn gmult(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    let mut i = 0;
    while i < 8 {
        if b & 1 != 0 {
            p ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= 0x1d;
        }
        b >>= 1;
        i += 1;
    }
    p
}

/// Computes the 3 parity bytes for `msg`, in transmit order
pub fn encode(msg: &[u8; RS129_DATA_BYTES]) -> [u8; RS129_PARITY_BYTES] {
    let mut reg = [0u8; RS129_PARITY_BYTES];
    for &m in msg.iter() {
        let dbyte = m ^ reg[2];
        reg[2] = reg[1] ^ gmult(POLY[2], dbyte);
        reg[1] = reg[0] ^ gmult(POLY[1], dbyte);
        reg[0] = gmult(POLY[0], dbyte);
    }
    [reg[2], reg[1], reg[0]]
}

/// Re-encodes the first 9 bytes and compares against the trailing 3
pub fn check(data: &[u8]) -> Result<bool, DmrErr> {
    let data: &[u8; RS129_BLOCK_BYTES] = data
        .try_into()
        .map_err(|_| DmrErr::InvalidLength { expected: RS129_BLOCK_BYTES, found: data.len() })?;
    let mut msg = [0u8; RS129_DATA_BYTES];
    msg.copy_from_slice(&data[..RS129_DATA_BYTES]);
    let parity = encode(&msg);
    Ok(parity[..] == data[RS129_DATA_BYTES..])
}
