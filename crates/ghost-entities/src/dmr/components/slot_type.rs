use crate::dmr::components::golay2087;
use crate::dmr::dmr_err::{DmrErr, FecCode};

/// Slot type bits are spread over these offsets of a 33-byte burst
pub const SLOT_TYPE_MIN_FRAME_BYTES: usize = 21;

/// Burst data type carried in the slot type field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    PiHeader,
    VoiceLcHeader,
    TerminatorWithLc,
    Csbk,
    MbcHeader,
    MbcContinuation,
    DataHeader,
    Rate12Data,
    Rate34Data,
    Idle,
    Rate1Data,
    Reserved(u8),
}

impl DataType {
    pub fn from_u8(dt: u8) -> Self {
        match dt & 0x0f {
            0 => DataType::PiHeader,
            1 => DataType::VoiceLcHeader,
            2 => DataType::TerminatorWithLc,
            3 => DataType::Csbk,
            4 => DataType::MbcHeader,
            5 => DataType::MbcContinuation,
            6 => DataType::DataHeader,
            7 => DataType::Rate12Data,
            8 => DataType::Rate34Data,
            9 => DataType::Idle,
            10 => DataType::Rate1Data,
            other => DataType::Reserved(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            DataType::PiHeader => 0,
            DataType::VoiceLcHeader => 1,
            DataType::TerminatorWithLc => 2,
            DataType::Csbk => 3,
            DataType::MbcHeader => 4,
            DataType::MbcContinuation => 5,
            DataType::DataHeader => 6,
            DataType::Rate12Data => 7,
            DataType::Rate34Data => 8,
            DataType::Idle => 9,
            DataType::Rate1Data => 10,
            DataType::Reserved(other) => other & 0x0f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotType {
    pub color_code: u8,
    pub data_type: DataType,
}

impl SlotType {
    pub fn new(color_code: u8, data_type: DataType) -> Self {
        Self { color_code: color_code & 0x0f, data_type }
    }

    /// Reads and error-corrects the slot type of a burst
    pub fn decode(frame: &[u8]) -> Result<Self, DmrErr> {
        check_len(frame)?;

        let b0 = ((frame[12] << 2) & 0xfc) | ((frame[13] >> 6) & 0x03);
        let b1 = ((frame[13] << 2) & 0xc0) | ((frame[19] << 2) & 0x3c) | ((frame[20] >> 6) & 0x03);
        let b2 = (frame[20] << 2) & 0xf0;
        let word = (b0 as u32) << 12 | (b1 as u32) << 4 | (b2 as u32) >> 4;

        let (code, corrected) = golay2087::decode(word).ok_or(DmrErr::FecUncorrectable { code: FecCode::Golay2087 })?;
        if corrected > 0 {
            tracing::trace!("slot type: corrected {} bit errors", corrected);
        }
        Ok(Self { color_code: code >> 4, data_type: DataType::from_u8(code & 0x0f) })
    }

    /// Encodes into the slot type bit positions of `frame`, leaving all other bits as they are
    pub fn encode(&self, frame: &mut [u8]) -> Result<(), DmrErr> {
        check_len(frame)?;

        let code = (self.color_code << 4) | self.data_type.as_u8();
        let word = golay2087::encode(code);
        let b0 = (word >> 12) as u8;
        let b1 = (word >> 4) as u8;
        let b2 = (word << 4) as u8;

        frame[12] = (frame[12] & 0xc0) | ((b0 >> 2) & 0x3f);
        frame[13] = (frame[13] & 0x0f) | ((b0 << 6) & 0xc0) | ((b1 >> 2) & 0x30);
        frame[19] = (frame[19] & 0xf0) | ((b1 >> 2) & 0x0f);
        frame[20] = (frame[20] & 0x03) | ((b1 << 6) & 0xc0) | ((b2 >> 2) & 0x3c);
        Ok(())
    }
}

fn check_len(frame: &[u8]) -> Result<(), DmrErr> {
    if frame.len() < SLOT_TYPE_MIN_FRAME_BYTES {
        return Err(DmrErr::DataTooShort { expected: SLOT_TYPE_MIN_FRAME_BYTES, found: frame.len() });
    }
    Ok(())
}
