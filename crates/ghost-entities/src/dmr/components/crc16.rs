/// CRC-16 CCITT (poly 0x1021, init 0xffff, inverted) as carried by CSBK and
/// data header blocks. The checksum is stored big-endian in the last two bytes.
pub const GEN_POLY: u16 = 0x1021;
pub const CRC_INIT: u16 = 0xffff;

const fn compute_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ GEN_POLY } else { crc << 1 };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

pub static CCITT16_TABLE: [u16; 256] = compute_table();

/// Inverted CRC over `input`, ready to be appended
pub fn crc16_ccitt(input: &[u8]) -> u16 {
    let mut crc = CRC_INIT;
    for &b in input {
        crc = (crc << 8) ^ CCITT16_TABLE[((crc >> 8) as u8 ^ b) as usize];
    }
    !crc
}

/// Computes the CRC over all but the last two bytes of `data` and writes it
/// into those two bytes. Buffers shorter than two bytes are left untouched.
pub fn append(data: &mut [u8]) {
    if data.len() < 2 {
        return;
    }
    let len = data.len() - 2;
    let crc = crc16_ccitt(&data[..len]);
    data[len..].copy_from_slice(&crc.to_be_bytes());
}

/// Returns the (computed, stored) checksum pair, or None if there is no room for a trailer
pub fn compare(data: &[u8]) -> Option<(u16, u16)> {
    if data.len() < 2 {
        return None;
    }
    let len = data.len() - 2;
    let stored = u16::from_be_bytes([data[len], data[len + 1]]);
    Some((crc16_ccitt(&data[..len]), stored))
}

/// True if the trailing two bytes hold the CRC of the bytes before them
pub fn verify(data: &[u8]) -> bool {
    matches!(compare(data), Some((computed, stored)) if computed == stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn test_check_value() {
        // CRC-16/GENIBUS check value
        assert_eq!(crc16_ccitt(b"123456789"), 0xd64e);
        assert_eq!(&CCITT16_TABLE[..4], &[0x0000, 0x1021, 0x2042, 0x3063]);
    }

    #[test]
    fn test_append_then_verify() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for len in [2usize, 3, 12, 14, 64] {
            let mut data = vec![0u8; len];
            rng.fill(&mut data[..]);
            append(&mut data);
            assert!(verify(&data), "len {}", len);
        }
    }

    #[test]
    fn test_single_bit_errors_detected() {
        let mut data = [0u8; 14];
        data[..12].copy_from_slice(&[0x38, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x00, 0xfd, 0x7f, 0x00, 0x00]);
        append(&mut data);
        for bit in 0..data.len() * 8 {
            let mut corrupted = data;
            corrupted[bit / 8] ^= 0x80 >> (bit % 8);
            assert!(!verify(&corrupted), "flip of bit {} went undetected", bit);
        }
    }

    #[test]
    fn test_short_buffers() {
        let mut one = [0xaau8];
        append(&mut one);
        assert_eq!(one, [0xaa]);
        assert!(!verify(&one));
        assert!(!verify(&[]));
    }
}
