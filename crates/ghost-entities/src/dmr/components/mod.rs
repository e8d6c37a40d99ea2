pub mod bptc19696;
pub mod crc16;
pub mod golay2087;
pub mod rs129;
pub mod slot_type;
