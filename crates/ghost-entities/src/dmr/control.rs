//! Admission of decoded DMR control traffic, and per-slot bookkeeping

use std::sync::Arc;
use std::time::{Duration, Instant};

use ghost_core::SlotNo;

use crate::dmr::access_control::AccessControl;
use crate::dmr::components::bptc19696;
use crate::dmr::components::slot_type::{DataType, SlotType};
use crate::dmr::csbk::{CSBKO_BSDWNACT, Csbk};
use crate::dmr::data_header::DataHeader;
use crate::dmr::dmr_err::DmrErr;
use crate::dmr::frame::{FRAME_HEADER_BYTES, FrameHeader};
use crate::dmr::full_lc::FullLc;
use crate::dmr::lookup::IdLookup;
use crate::dmr::slot::{NetState, RfState, SLOT_QUEUE_CAPACITY, Slot};
use crate::dmr::voice::{self, VOICE_SYNC_SEQ};

/// Exact size of a wakeup frame as handed over by the modem
pub const WAKEUP_FRAME_BYTES: usize = 33;

pub struct Control {
    color_code: u8,
    slots: [Slot; 2],
    lookup: Box<dyn IdLookup>,
    access: Arc<AccessControl>,
    /// Keep only embedded signalling as the slot LC, not the voice header LC
    embedded_lc_only: bool,
}

impl Control {
    pub fn new(color_code: u8, timeout: Duration, lookup: Box<dyn IdLookup>, access: Arc<AccessControl>) -> Self {
        Self {
            color_code,
            slots: [Slot::new(SlotNo::One, timeout), Slot::new(SlotNo::Two, timeout)],
            lookup,
            access,
            embedded_lc_only: false,
        }
    }

    pub fn set_embedded_lc_only(&mut self, embedded_lc_only: bool) {
        self.embedded_lc_only = embedded_lc_only;
    }

    pub fn color_code(&self) -> u8 {
        self.color_code
    }

    pub fn access(&self) -> &Arc<AccessControl> {
        &self.access
    }

    pub fn slot(&self, slot: SlotNo) -> &Slot {
        &self.slots[slot.idx()]
    }

    pub fn slot_mut(&mut self, slot: SlotNo) -> &mut Slot {
        &mut self.slots[slot.idx()]
    }

    /// Both slots at once, so each can be driven by its own worker
    pub fn slots_mut(&mut self) -> (&mut Slot, &mut Slot) {
        let [one, two] = &mut self.slots;
        (one, two)
    }

    /// Decodes a wakeup frame and admits it if it is a downlink activate from an allowed source
    pub fn process_wakeup(&self, data: &[u8]) -> Result<Csbk, DmrErr> {
        let hdr = FrameHeader::parse(data)?;
        if data.len() != WAKEUP_FRAME_BYTES {
            return Err(DmrErr::InvalidLength { expected: WAKEUP_FRAME_BYTES, found: data.len() });
        }
        hdr.check_wakeup()?;

        let csbk = Csbk::decode_block(&data[FRAME_HEADER_BYTES..])?;
        self.admit_wakeup(csbk)
    }

    /// Admission part of [`Control::process_wakeup`], for an already decoded CSBK
    pub fn admit_wakeup(&self, csbk: Csbk) -> Result<Csbk, DmrErr> {
        if csbk.csbko != CSBKO_BSDWNACT {
            return Err(DmrErr::UnexpectedOpcode { expected: CSBKO_BSDWNACT, found: csbk.csbko });
        }

        let src = self.lookup.resolve(csbk.src_id);
        if !self.access.validate_source(csbk.src_id) {
            tracing::warn!(target: "security", "downlink activate from {} ({}) denied", src, csbk.src_id);
            return Err(DmrErr::AccessDenied { src_id: csbk.src_id, dst_id: None });
        }

        tracing::info!("downlink activate from {}", src);
        Ok(csbk)
    }

    /// Decodes a data header received on `slot` and admits the transfer.
    /// Admitted transfers put the slot into the data state, refused ones into rejected.
    pub fn process_data_header(&mut self, slot: SlotNo, bytes: &[u8], now: Instant) -> Result<DataHeader, DmrErr> {
        let hdr = DataHeader::put(bytes)?;

        let src = self.lookup.resolve(hdr.src_id);
        let admitted = self.access.validate_source(hdr.src_id)
            && self.access.validate_talkgroup(slot, hdr.gi, hdr.dst_id);
        if !admitted {
            tracing::warn!(target: "security", slot = %slot, "data header from {} to {} denied", src, hdr.dst_id);
            self.slot_mut(slot).update_state(RfState::Rejected, NetState::Idle, now);
            return Err(DmrErr::AccessDenied { src_id: hdr.src_id, dst_id: Some(hdr.dst_id) });
        }

        tracing::info!(
            slot = %slot,
            "data header from {} to {}{}, {} blocks",
            src,
            if hdr.gi { "TG " } else { "" },
            hdr.dst_id,
            hdr.blocks
        );
        let state = self.slot_mut(slot);
        state.update_state(RfState::Data, state.net_state(), now);
        Ok(hdr)
    }

    /// Checks the slot type of a full burst against the local color code.
    /// Voice LC headers are admitted like data headers; terminators end the transmission.
    pub fn process_burst(&mut self, slot: SlotNo, burst: &[u8], now: Instant) -> Result<SlotType, DmrErr> {
        let st = SlotType::decode(burst)?;
        if st.color_code != self.color_code {
            return Err(DmrErr::ColorCodeMismatch { expected: self.color_code, found: st.color_code });
        }

        match st.data_type {
            DataType::Idle => {}
            DataType::VoiceLcHeader => self.process_voice_lc_header(slot, burst, now)?,
            DataType::TerminatorWithLc => self.process_terminator(slot, burst),
            _ => {
                let state = self.slot_mut(slot);
                if !state.is_idle() {
                    state.touch(now);
                }
            }
        }
        Ok(st)
    }

    fn process_voice_lc_header(&mut self, slot: SlotNo, burst: &[u8], now: Instant) -> Result<(), DmrErr> {
        // The header is repeated at the start of a call
        if matches!(self.slot(slot).rf_state(), RfState::Audio | RfState::Rejected) {
            self.slot_mut(slot).touch(now);
            return Ok(());
        }

        let payload = bptc19696::decode_burst(burst)?;
        let lc = FullLc::decode(&payload, DataType::VoiceLcHeader)?;

        let src = self.lookup.resolve(lc.src_id);
        let tg = if lc.is_group() { "TG " } else { "" };
        let admitted = self.access.validate_source(lc.src_id)
            && self.access.validate_talkgroup(slot, lc.is_group(), lc.dst_id);
        if !admitted {
            tracing::warn!(target: "security", slot = %slot, "voice call from {} to {}{} denied", src, tg, lc.dst_id);
            self.slot_mut(slot).update_state(RfState::Rejected, NetState::Idle, now);
            return Err(DmrErr::AccessDenied { src_id: lc.src_id, dst_id: Some(lc.dst_id) });
        }

        tracing::info!(slot = %slot, "voice call from {} to {}{}", src, tg, lc.dst_id);
        let keep_lc = !self.embedded_lc_only;
        let state = self.slot_mut(slot);
        if keep_lc {
            state.set_embedded_lc(lc);
        }
        state.update_state(RfState::Audio, state.net_state(), now);
        Ok(())
    }

    fn process_terminator(&mut self, slot: SlotNo, burst: &[u8]) {
        let state = &mut self.slots[slot.idx()];
        match state.rf_state() {
            RfState::Listening => return,
            RfState::Audio => {
                let audio = state.dequeue(SLOT_QUEUE_CAPACITY);
                match bptc19696::decode_burst(burst).and_then(|p| FullLc::decode(&p, DataType::TerminatorWithLc)) {
                    Ok(lc) => tracing::info!(
                        slot = %slot,
                        "end of voice call from {} to {}, {} bytes of audio",
                        self.lookup.resolve(lc.src_id),
                        lc.dst_id,
                        audio.len()
                    ),
                    Err(e) => tracing::info!(slot = %slot, "end of voice call, {} bytes of audio, terminator LC: {}", audio.len(), e),
                }
            }
            RfState::Data | RfState::Rejected => tracing::debug!(slot = %slot, "end of transmission"),
        }
        state.reset();
    }

    /// Queues the vocoder bits of an admitted call. Bursts B..F also carry embedded signalling.
    /// Voice on a slot without an admitted header is ignored.
    pub fn process_voice(&mut self, slot: SlotNo, seq: u8, burst: &[u8], now: Instant) -> Result<(), DmrErr> {
        let (audio, embedded) = voice::split_burst(burst)?;
        let state = self.slot_mut(slot);
        match state.rf_state() {
            RfState::Audio => {}
            RfState::Rejected => {
                state.touch(now);
                return Ok(());
            }
            RfState::Listening | RfState::Data => {
                tracing::trace!(slot = %slot, "voice burst without header");
                return Ok(());
            }
        }

        if seq != VOICE_SYNC_SEQ {
            state.process_embedded_data(&embedded);
        }
        if let Err(e) = state.enqueue(&audio) {
            tracing::warn!(slot = %slot, "dropping voice burst: {}", e);
        }
        state.touch(now);
        Ok(())
    }

    /// Runs the inactivity timeout of both slots. Returns the slots that were reset.
    pub fn check_timeouts(&mut self, now: Instant) -> Vec<SlotNo> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.check_timeout(now).then(|| slot.slot_no()))
            .collect()
    }
}
