use ghost_config::CfgPocsag;
use ghost_core::Protocol;

use crate::handler_trait::{HandlerStats, ProtocolHandler, drop_frame};

/// POCSAG is transmit only towards the modem, received frames are unexpected
pub struct PocsagHandler {
    frequency: u32,
    stats: HandlerStats,
}

impl PocsagHandler {
    pub fn new(cfg: &CfgPocsag) -> Self {
        tracing::info!("POCSAG handler initialized, {} Hz", cfg.frequency);
        Self { frequency: cfg.frequency, stats: HandlerStats::default() }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }
}

impl ProtocolHandler for PocsagHandler {
    fn protocol(&self) -> Protocol {
        Protocol::Pocsag
    }

    fn handle(&mut self, frame: &[u8]) {
        tracing::warn!("POCSAG: unexpected {} byte frame from modem", frame.len());
        drop_frame(Protocol::Pocsag, &mut self.stats, frame);
    }

    fn stats(&self) -> HandlerStats {
        self.stats
    }
}
