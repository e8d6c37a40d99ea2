//! Core utilities for the MMDVM ghost host
//!
//! This crate provides fundamental types and utilities used across the host:
//! - Bit-level helpers for MSB-first byte/bit conversion
//! - Protocol identifiers used to route modem frames
//! - DMR time slot numbering
//! - Common macros and debug utilities

pub mod bits;
pub mod debug;
pub mod protocol;
pub mod timeslot;

// Re-export commonly used items
pub use protocol::Protocol;
pub use timeslot::SlotNo;

/// A DMR radio or repeater identity (24 bits on air)
pub type DmrId = u32;
