use ghost_core::{DmrId, assert_warn, bits, unimplemented_log};

use crate::dmr::components::crc16;
use crate::dmr::dmr_err::DmrErr;

/// Header bytes including the 2-byte CRC trailer at the end
pub const DATA_HEADER_BYTES: usize = 12;

/// Data packet format, low nibble of byte 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpf {
    Udt,
    Response,
    Unconfirmed,
    Confirmed,
    DefinedShort,
    DefinedRaw,
    Proprietary,
    Reserved(u8),
}

impl Dpf {
    pub fn from_u8(dpf: u8) -> Self {
        match dpf & 0x0f {
            0x00 => Dpf::Udt,
            0x01 => Dpf::Response,
            0x02 => Dpf::Unconfirmed,
            0x03 => Dpf::Confirmed,
            0x0d => Dpf::DefinedShort,
            0x0e => Dpf::DefinedRaw,
            0x0f => Dpf::Proprietary,
            other => Dpf::Reserved(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataHeader {
    pub data: [u8; DATA_HEADER_BYTES],
    pub gi: bool,
    pub a: bool,
    pub dpf: Dpf,
    pub sap: u8,
    pub src_id: DmrId,
    pub dst_id: DmrId,
    pub blocks: u8,
    pub f: bool,
    pub s: bool,
    pub ns: u8,
}

impl DataHeader {
    /// Decodes the first 12 bytes of `bytes`; bytes 10 and 11 must carry the CRC of bytes 0..10
    pub fn put(bytes: &[u8]) -> Result<Self, DmrErr> {
        if bytes.len() < DATA_HEADER_BYTES {
            return Err(DmrErr::DataTooShort { expected: DATA_HEADER_BYTES, found: bytes.len() });
        }
        let mut data = [0u8; DATA_HEADER_BYTES];
        data.copy_from_slice(&bytes[..DATA_HEADER_BYTES]);

        if let Some((computed, stored)) = crc16::compare(&data) {
            if computed != stored {
                return Err(DmrErr::InvalidCrc { expected: computed, found: stored });
            }
        }

        let dpf = Dpf::from_u8(data[0]);
        let mut hdr = DataHeader {
            data,
            gi: data[0] & 0x80 != 0,
            a: data[0] & 0x40 != 0,
            dpf,
            sap: data[1] >> 4,
            dst_id: bits::read_u24_be(&data[2..5]),
            src_id: bits::read_u24_be(&data[5..8]),
            blocks: 0,
            f: false,
            s: false,
            ns: 0,
        };

        match dpf {
            Dpf::Unconfirmed => {
                hdr.f = data[8] & 0x80 != 0;
                hdr.blocks = data[8] & 0x7f;
            }
            Dpf::Confirmed => {
                hdr.f = data[8] & 0x80 != 0;
                hdr.blocks = data[8] & 0x7f;
                hdr.s = data[9] & 0x80 != 0;
                hdr.ns = (data[9] >> 4) & 0x07;
                assert_warn!(hdr.blocks > 0, "confirmed header from {} announces no blocks", hdr.src_id);
            }
            Dpf::Response => {
                hdr.blocks = data[8] & 0x7f;
            }
            Dpf::DefinedShort => {
                hdr.blocks = (data[0] & 0x30) + (data[1] & 0x0f);
                hdr.f = data[8] & 0x01 != 0;
            }
            Dpf::DefinedRaw => {
                hdr.blocks = (data[0] & 0x30) + (data[1] & 0x0f);
            }
            Dpf::Udt => unimplemented_log!("UDT header fields from {}", hdr.src_id),
            Dpf::Proprietary | Dpf::Reserved(_) => {}
        }

        tracing::debug!(
            "data header: {:?} sap {} {} -> {} ({}), {} blocks",
            hdr.dpf,
            hdr.sap,
            hdr.src_id,
            hdr.dst_id,
            if hdr.gi { "group" } else { "individual" },
            hdr.blocks
        );
        Ok(hdr)
    }
}
