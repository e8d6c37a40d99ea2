//! Builders for modem frames as the DMR handler receives them

use ghost_core::{DmrId, SlotNo, bits};
use ghost_entities::dmr::components::bptc19696;
use ghost_entities::dmr::components::crc16;
use ghost_entities::dmr::components::slot_type::{DataType, SlotType};
use ghost_entities::dmr::frame::{SLOT2_FLAG, VOICE_FLAG};
use ghost_entities::dmr::full_lc::{FLCO_GROUP, FullLc};
use ghost_entities::dmr::voice::{self, EMBEDDED_FIELD_BYTES, VOICE_PAYLOAD_BYTES};

/// Source id whose bytes (0x00 0xfd 0x7f) pass the BPTC group corrector unchanged
pub const FIXED_POINT_SRC_ID: DmrId = 64895;

fn flags(slot: SlotNo, data_type: DataType) -> u8 {
    let slot_flag = if slot == SlotNo::Two { SLOT2_FLAG } else { 0 };
    slot_flag | data_type.as_u8()
}

/// 33-byte wakeup frame carrying a BSDWNACT CSBK
pub fn wakeup_frame(src_id: DmrId) -> Vec<u8> {
    let mut payload = [0u8; 12];
    payload[0] = 0x78;
    bits::write_u24_be(src_id, &mut payload[7..10]);
    let block = bptc19696::interleave_payload(&payload);

    let mut frame = vec![0x00, 0x03];
    frame.extend_from_slice(&block[..31]);
    frame
}

/// Unconfirmed data header with CRC trailer
pub fn data_header_frame(slot: SlotNo, group: bool, dst_id: DmrId, src_id: DmrId) -> Vec<u8> {
    let mut hdr = [0u8; 12];
    hdr[0] = if group { 0x82 } else { 0x02 };
    bits::write_u24_be(dst_id, &mut hdr[2..5]);
    bits::write_u24_be(src_id, &mut hdr[5..8]);
    hdr[8] = 0x02;
    crc16::append(&mut hdr);

    let mut frame = vec![0x00, flags(slot, DataType::DataHeader)];
    frame.extend_from_slice(&hdr);
    frame
}

/// Full 33-byte burst with only the slot type populated
pub fn burst_frame(slot: SlotNo, color_code: u8, data_type: DataType) -> Vec<u8> {
    let mut burst = [0u8; 33];
    SlotType::new(color_code, data_type).encode(&mut burst).unwrap();

    let mut frame = vec![0x00, flags(slot, data_type)];
    frame.extend_from_slice(&burst);
    frame
}

/// Talk group whose LC header and terminator bytes all pass the BPTC group corrector
/// for calls from [`FIXED_POINT_SRC_ID`]
pub const FIXED_POINT_TG: DmrId = 1926;
/// Talk group whose LC header (but not terminator) passes the group corrector
pub const FIXED_POINT_HEADER_TG: DmrId = 13;

/// Voice LC header or terminator for a group call from [`FIXED_POINT_SRC_ID`]
pub fn lc_burst_frame(slot: SlotNo, dst_id: DmrId, data_type: DataType) -> Vec<u8> {
    let lc = FullLc {
        pf: false,
        flco: FLCO_GROUP,
        fid: 0,
        service_options: 0,
        dst_id,
        src_id: FIXED_POINT_SRC_ID,
    };
    let block = bptc19696::interleave_payload(&lc.encode(data_type).unwrap());
    let mut burst = [0u8; 33];
    bptc19696::insert_burst_block(&block, &mut burst).unwrap();
    SlotType::new(1, data_type).encode(&mut burst).unwrap();

    let mut frame = vec![0x00, flags(slot, data_type)];
    frame.extend_from_slice(&burst);
    frame
}

/// Voice burst `seq` (0 = A) of a superframe
pub fn voice_frame(slot: SlotNo, seq: u8) -> Vec<u8> {
    let audio = [seq; VOICE_PAYLOAD_BYTES];
    let embedded = [0x10 | seq; EMBEDDED_FIELD_BYTES];
    let slot_flag = if slot == SlotNo::Two { SLOT2_FLAG } else { 0 };

    let mut frame = vec![0x00, slot_flag | VOICE_FLAG | seq];
    frame.extend_from_slice(&voice::build_burst(&audio, &embedded));
    frame
}
