//! Control Signalling Block decoding
//!
//! A CSBK arrives BPTC(196,96) coded. Decoding recovers the 12 payload
//! bytes, checks them against a CRC trailer and extracts the fields of the
//! few opcodes the host acts on. Anything else is rejected.

use ghost_core::{DmrId, bits};

use crate::dmr::components::bptc19696::{self, BPTC_BLOCK_BYTES, BPTC_PAYLOAD_BYTES};
use crate::dmr::components::crc16;
use crate::dmr::dmr_err::DmrErr;
use crate::dmr::frame::{FRAME_HEADER_BYTES, FrameHeader};

/// BS Outbound Activation
pub const CSBKO_BSDWNACT: u8 = 0x38;
/// Unit to Unit Voice Service Request
pub const CSBKO_UUVREQ: u8 = 0x04;

pub const CSBK_PAYLOAD_BYTES: usize = BPTC_PAYLOAD_BYTES;
pub const CSBK_BYTES: usize = CSBK_PAYLOAD_BYTES + 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csbk {
    /// Payload followed by its CRC trailer
    pub data: [u8; CSBK_BYTES],
    pub csbko: u8,
    pub fid: u8,
    pub gi: bool,
    pub bs_id: DmrId,
    pub src_id: DmrId,
    pub dst_id: DmrId,
    pub data_content: bool,
    pub cbf: u8,
    pub ovcm: bool,
}

impl Csbk {
    /// Decodes a complete wakeup frame: header followed by the coded block
    pub fn put(frame: &[u8]) -> Result<Self, DmrErr> {
        FrameHeader::parse(frame)?.check_wakeup()?;
        Self::decode_block(&frame[FRAME_HEADER_BYTES..])
    }

    /// Decodes a BPTC coded block. Short blocks are zero padded and long ones
    /// truncated to the 33-byte block size.
    pub fn decode_block(block: &[u8]) -> Result<Self, DmrErr> {
        let mut padded = [0u8; BPTC_BLOCK_BYTES];
        let n = block.len().min(BPTC_BLOCK_BYTES);
        padded[..n].copy_from_slice(&block[..n]);

        let payload = bptc19696::decode(&padded)?;
        Self::from_payload(&payload)
    }

    /// Builds a CSBK from an already error-corrected 12-byte payload
    pub fn from_payload(payload: &[u8; CSBK_PAYLOAD_BYTES]) -> Result<Self, DmrErr> {
        let mut data = [0u8; CSBK_BYTES];
        data[..CSBK_PAYLOAD_BYTES].copy_from_slice(payload);

        // The trailer is derived locally, the coded block does not carry one
        crc16::append(&mut data);
        if let Some((computed, stored)) = crc16::compare(&data) {
            if computed != stored {
                return Err(DmrErr::InvalidCrc { expected: computed, found: stored });
            }
        }

        let mut csbk = Csbk {
            data,
            csbko: payload[0] & 0x3f,
            fid: payload[1],
            gi: false,
            bs_id: 0,
            src_id: 0,
            dst_id: 0,
            data_content: false,
            cbf: 0,
            ovcm: false,
        };

        match csbk.csbko {
            CSBKO_BSDWNACT => {
                csbk.bs_id = bits::read_u24_be(&payload[4..7]);
                csbk.src_id = bits::read_u24_be(&payload[7..10]);
            }
            CSBKO_UUVREQ => {
                csbk.dst_id = bits::read_u24_be(&payload[4..7]);
                csbk.src_id = bits::read_u24_be(&payload[7..10]);
                csbk.ovcm = payload[2] & 0x04 != 0;
            }
            other => return Err(DmrErr::UnsupportedOpcode { csbko: other }),
        }

        tracing::debug!(
            "csbk: csbko 0x{:02x} fid {} src {} dst {} bs {}",
            csbk.csbko,
            csbk.fid,
            csbk.src_id,
            csbk.dst_id,
            csbk.bs_id
        );
        Ok(csbk)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..CSBK_PAYLOAD_BYTES]
    }
}
