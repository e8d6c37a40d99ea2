use std::sync::Arc;
use std::time::{Duration, Instant};

use ghost_config::SharedConfig;
use ghost_core::Protocol;

use crate::dmr::access_control::AccessControl;
use crate::dmr::components::slot_type::DataType;
use crate::dmr::control::Control;
use crate::dmr::dmr_err::{DmrErr, DmrErrKind};
use crate::dmr::frame::{FRAME_HEADER_BYTES, FrameHeader};
use crate::dmr::lookup::IdLookup;
use crate::handler_trait::{HandlerStats, ProtocolHandler};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmrStats {
    pub frames: u64,
    pub accepted: u64,
    /// Well-formed frames refused by access control
    pub denied: u64,
    /// Frames lost to length, checksum, FEC or framing errors
    pub corrupt: u64,
    /// Valid frames carrying something we do not act on
    pub unsupported: u64,
}

/// DMR protocol handler. Routes frames by their header to the [`Control`] orchestrator.
pub struct DmrHost {
    control: Control,
    dump_ta_data: bool,
    stats: DmrStats,
}

impl DmrHost {
    pub fn new(config: SharedConfig, access: Arc<AccessControl>, lookup: Box<dyn IdLookup>) -> Self {
        let cfg = config.config();
        let timeout = Duration::from_secs(cfg.general.timeout_secs as u64);
        tracing::info!(
            "DMR handler initialized, color code {}, timeout {:?}, self only {}",
            cfg.dmr.color_code,
            timeout,
            access.self_only()
        );
        if cfg.dmr.beacons {
            tracing::info!("DMR beacons requested, not supported in receive-only mode");
        }
        let mut control = Control::new(cfg.dmr.color_code, timeout, lookup, access);
        control.set_embedded_lc_only(cfg.dmr.embedded_lc_only);
        Self {
            control,
            dump_ta_data: cfg.dmr.dump_ta_data,
            stats: DmrStats::default(),
        }
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn dmr_stats(&self) -> DmrStats {
        self.stats
    }

    fn process(&mut self, frame: &[u8], now: Instant) -> Result<(), DmrErr> {
        let hdr = FrameHeader::parse(frame)?;
        let slot = hdr.slot();
        let body = &frame[FRAME_HEADER_BYTES..];
        if hdr.is_voice() {
            return self.control.process_voice(slot, hdr.voice_seq(), body, now);
        }
        match hdr.data_type() {
            DataType::Csbk => self.control.process_wakeup(frame).map(|_| ()),
            DataType::DataHeader => self.control.process_data_header(slot, body, now).map(|_| ()),
            _ => {
                let st = self.control.process_burst(slot, body, now)?;
                if self.dump_ta_data && st.data_type == DataType::TerminatorWithLc {
                    tracing::info!(slot = %slot, "terminator {:02x?}", body);
                }
                Ok(())
            }
        }
    }
}

impl ProtocolHandler for DmrHost {
    fn protocol(&self) -> Protocol {
        Protocol::Dmr
    }

    fn handle(&mut self, frame: &[u8]) {
        self.stats.frames += 1;
        match self.process(frame, Instant::now()) {
            Ok(()) => self.stats.accepted += 1,
            Err(e) => match e.kind() {
                // Already reported under the security target
                DmrErrKind::AccessDenied => self.stats.denied += 1,
                DmrErrKind::Opcode => {
                    self.stats.unsupported += 1;
                    tracing::debug!("DMR frame ignored: {}", e);
                }
                DmrErrKind::Length | DmrErrKind::Framing | DmrErrKind::Checksum | DmrErrKind::FecUncorrectable => {
                    self.stats.corrupt += 1;
                    tracing::warn!("DMR frame dropped: {}", e);
                }
            },
        }
    }

    fn tick(&mut self, now: Instant) {
        for slot in self.control.check_timeouts(now) {
            tracing::debug!(slot = %slot, "slot reset after inactivity");
        }
    }

    fn stats(&self) -> HandlerStats {
        HandlerStats {
            frames: self.stats.frames,
            dropped: self.stats.frames - self.stats.accepted,
        }
    }
}
