use core::fmt;

/// One of the two TDMA time slots of a DMR carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotNo {
    One,
    Two,
}

impl SlotNo {
    pub fn from_u8(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(SlotNo::One),
            2 => Some(SlotNo::Two),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            SlotNo::One => 1,
            SlotNo::Two => 2,
        }
    }

    /// Index into two-element per-slot arrays
    pub fn idx(self) -> usize {
        self.as_u8() as usize - 1
    }
}

impl fmt::Display for SlotNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{}", self.as_u8())
    }
}
