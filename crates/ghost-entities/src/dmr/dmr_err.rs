use core::fmt;

use ghost_core::DmrId;

/// Coarse classification of [`DmrErr`], for callers that only need to
/// tell corrupt frames apart from policy rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmrErrKind {
    /// Input was too short or not of the exact required size
    Length,
    /// Frame header or color code does not belong here
    Framing,
    /// CRC or other checksum mismatch
    Checksum,
    /// Forward error correction could not recover the block
    FecUncorrectable,
    /// Opcode is not supported, or not the one expected
    Opcode,
    /// Well-formed frame rejected by access control
    AccessDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecCode {
    Bptc19696,
    ReedSolomon129,
    Golay2087,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmrErr {
    DataTooShort { expected: usize, found: usize },
    InvalidLength { expected: usize, found: usize },
    /// Header tag or flag byte of a wakeup frame does not match
    InvalidWakeup { tag: u8, flags: u8 },
    InvalidCrc { expected: u16, found: u16 },
    FecUncorrectable { code: FecCode },
    UnsupportedOpcode { csbko: u8 },
    UnexpectedOpcode { expected: u8, found: u8 },
    /// Burst data type has no decoder here
    UnsupportedDataType { data_type: u8 },
    ColorCodeMismatch { expected: u8, found: u8 },
    AccessDenied { src_id: DmrId, dst_id: Option<DmrId> },
}

impl DmrErr {
    pub fn kind(&self) -> DmrErrKind {
        match self {
            DmrErr::DataTooShort { .. } | DmrErr::InvalidLength { .. } => DmrErrKind::Length,
            DmrErr::InvalidWakeup { .. } | DmrErr::ColorCodeMismatch { .. } => DmrErrKind::Framing,
            DmrErr::InvalidCrc { .. } => DmrErrKind::Checksum,
            DmrErr::FecUncorrectable { .. } => DmrErrKind::FecUncorrectable,
            DmrErr::UnsupportedOpcode { .. }
            | DmrErr::UnexpectedOpcode { .. }
            | DmrErr::UnsupportedDataType { .. } => DmrErrKind::Opcode,
            DmrErr::AccessDenied { .. } => DmrErrKind::AccessDenied,
        }
    }

    /// True for rejections that say nothing about frame integrity
    pub fn is_policy(&self) -> bool {
        self.kind() == DmrErrKind::AccessDenied
    }
}

impl fmt::Display for DmrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmrErr::DataTooShort { expected, found } => {
                write!(f, "data too short: need {} bytes, got {}", expected, found)
            }
            DmrErr::InvalidLength { expected, found } => {
                write!(f, "invalid length: expected {} bytes, got {}", expected, found)
            }
            DmrErr::InvalidWakeup { tag, flags } => {
                write!(f, "not a wakeup frame: tag 0x{:02x} flags 0x{:02x}", tag, flags)
            }
            DmrErr::InvalidCrc { expected, found } => {
                write!(f, "crc mismatch: expected 0x{:04x}, found 0x{:04x}", expected, found)
            }
            DmrErr::FecUncorrectable { code } => write!(f, "uncorrectable {:?} block", code),
            DmrErr::UnsupportedOpcode { csbko } => write!(f, "unsupported csbko 0x{:02x}", csbko),
            DmrErr::UnexpectedOpcode { expected, found } => {
                write!(f, "expected csbko 0x{:02x}, got 0x{:02x}", expected, found)
            }
            DmrErr::UnsupportedDataType { data_type } => write!(f, "unsupported data type {}", data_type),
            DmrErr::ColorCodeMismatch { expected, found } => {
                write!(f, "color code {} does not match local color code {}", found, expected)
            }
            DmrErr::AccessDenied { src_id, dst_id: Some(dst) } => {
                write!(f, "access denied for {} to {}", src_id, dst)
            }
            DmrErr::AccessDenied { src_id, dst_id: None } => write!(f, "access denied for {}", src_id),
        }
    }
}

impl std::error::Error for DmrErr {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(DmrErr::DataTooShort { expected: 2, found: 1 }.kind(), DmrErrKind::Length);
        assert_eq!(DmrErr::InvalidCrc { expected: 1, found: 2 }.kind(), DmrErrKind::Checksum);
        assert_eq!(DmrErr::UnsupportedOpcode { csbko: 0x3f }.kind(), DmrErrKind::Opcode);
        let denied = DmrErr::AccessDenied { src_id: 1234567, dst_id: None };
        assert!(denied.is_policy());
        assert!(!DmrErr::FecUncorrectable { code: FecCode::Golay2087 }.is_policy());
        assert_eq!(denied.to_string(), "access denied for 1234567");
    }
}
