//! Full link control carried in voice LC headers and terminators.
//! The 9 LC bytes are protected by RS(12,9) parity XORed with a per-type mask.

use ghost_core::{DmrId, bits};

use crate::dmr::components::rs129::{self, RS129_BLOCK_BYTES, RS129_DATA_BYTES};
use crate::dmr::components::slot_type::DataType;
use crate::dmr::dmr_err::{DmrErr, FecCode};

pub const VOICE_LC_HEADER_CRC_MASK: [u8; 3] = [0x96, 0x96, 0x96];
pub const TERMINATOR_WITH_LC_CRC_MASK: [u8; 3] = [0x99, 0x99, 0x99];

/// Group voice channel user
pub const FLCO_GROUP: u8 = 0x00;
/// Unit to unit voice channel user
pub const FLCO_USER_USER: u8 = 0x03;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullLc {
    pub pf: bool,
    pub flco: u8,
    pub fid: u8,
    pub service_options: u8,
    pub dst_id: DmrId,
    pub src_id: DmrId,
}

fn crc_mask(data_type: DataType) -> Option<[u8; 3]> {
    match data_type {
        DataType::VoiceLcHeader => Some(VOICE_LC_HEADER_CRC_MASK),
        DataType::TerminatorWithLc => Some(TERMINATOR_WITH_LC_CRC_MASK),
        _ => None,
    }
}

impl FullLc {
    /// Decodes a 12-byte LC block of the given burst type.
    /// Only voice LC headers and terminators carry a full LC.
    pub fn decode(block: &[u8], data_type: DataType) -> Result<Self, DmrErr> {
        let block: &[u8; RS129_BLOCK_BYTES] = block
            .try_into()
            .map_err(|_| DmrErr::InvalidLength { expected: RS129_BLOCK_BYTES, found: block.len() })?;
        let mask = crc_mask(data_type).ok_or(DmrErr::UnsupportedDataType { data_type: data_type.as_u8() })?;

        let mut unmasked = *block;
        for (b, m) in unmasked[RS129_DATA_BYTES..].iter_mut().zip(mask) {
            *b ^= m;
        }
        if !rs129::check(&unmasked)? {
            return Err(DmrErr::FecUncorrectable { code: FecCode::ReedSolomon129 });
        }

        Ok(FullLc {
            pf: block[0] & 0x80 != 0,
            flco: block[0] & 0x3f,
            fid: block[1],
            service_options: block[2],
            dst_id: bits::read_u24_be(&block[3..6]),
            src_id: bits::read_u24_be(&block[6..9]),
        })
    }

    /// Encodes into a 12-byte LC block with masked parity
    pub fn encode(&self, data_type: DataType) -> Result<[u8; RS129_BLOCK_BYTES], DmrErr> {
        let mask = crc_mask(data_type).ok_or(DmrErr::UnsupportedDataType { data_type: data_type.as_u8() })?;
        let mut msg = [0u8; RS129_DATA_BYTES];
        msg[0] = (self.flco & 0x3f) | if self.pf { 0x80 } else { 0x00 };
        msg[1] = self.fid;
        msg[2] = self.service_options;
        bits::write_u24_be(self.dst_id, &mut msg[3..6]);
        bits::write_u24_be(self.src_id, &mut msg[6..9]);

        let parity = rs129::encode(&msg);
        let mut out = [0u8; RS129_BLOCK_BYTES];
        out[..RS129_DATA_BYTES].copy_from_slice(&msg);
        for ((o, p), m) in out[RS129_DATA_BYTES..].iter_mut().zip(parity).zip(mask) {
            *o = p ^ m;
        }
        Ok(out)
    }

    pub fn is_group(&self) -> bool {
        self.flco == FLCO_GROUP
    }
}
