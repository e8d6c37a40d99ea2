//! Two-byte header in front of every DMR frame handed over by the modem

use ghost_core::SlotNo;

use crate::dmr::components::slot_type::DataType;
use crate::dmr::dmr_err::DmrErr;

pub const TAG_DATA: u8 = 0x00;
pub const DMR_IDLE_RX: u8 = 0x01;
pub const DMR_SYNC_DATA: u8 = 0x02;
pub const DT_CSBK: u8 = 0x03;
/// Flag byte expected on a wakeup frame
pub const WAKEUP_FLAGS: u8 = DMR_IDLE_RX | DMR_SYNC_DATA | DT_CSBK;
/// Set in the flag byte for frames received on time slot 2
pub const SLOT2_FLAG: u8 = 0x80;
/// Voice burst. The low nibble then holds the burst index in the superframe instead of a data type.
pub const VOICE_FLAG: u8 = 0x20;
pub const FRAME_HEADER_BYTES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub tag: u8,
    pub flags: u8,
}

impl FrameHeader {
    pub fn parse(frame: &[u8]) -> Result<Self, DmrErr> {
        if frame.len() < FRAME_HEADER_BYTES {
            return Err(DmrErr::DataTooShort { expected: FRAME_HEADER_BYTES, found: frame.len() });
        }
        Ok(Self { tag: frame[0], flags: frame[1] })
    }

    /// Tag and flags both match the idle-rx, sync-data, CSBK pattern
    pub fn is_wakeup(&self) -> bool {
        self.tag == TAG_DATA && self.flags == WAKEUP_FLAGS
    }

    pub fn check_wakeup(&self) -> Result<(), DmrErr> {
        if self.is_wakeup() {
            Ok(())
        } else {
            Err(DmrErr::InvalidWakeup { tag: self.tag, flags: self.flags })
        }
    }

    pub fn is_voice(&self) -> bool {
        self.flags & VOICE_FLAG != 0
    }

    /// Burst index 0..=5 of a voice frame
    pub fn voice_seq(&self) -> u8 {
        self.flags & 0x0f
    }

    pub fn data_type(&self) -> DataType {
        DataType::from_u8(self.flags & 0x0f)
    }

    pub fn slot(&self) -> SlotNo {
        if self.flags & SLOT2_FLAG != 0 { SlotNo::Two } else { SlotNo::One }
    }
}
