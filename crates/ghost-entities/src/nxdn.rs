use ghost_config::CfgPortProtocol;
use ghost_core::Protocol;

use crate::handler_trait::{HandlerStats, ProtocolHandler, drop_frame};

/// NXDN frames are counted and dropped
pub struct NxdnHandler {
    port: String,
    stats: HandlerStats,
}

impl NxdnHandler {
    pub fn new(cfg: &CfgPortProtocol) -> Self {
        tracing::info!("NXDN handler initialized on port {:?}", cfg.port);
        Self { port: cfg.port.clone(), stats: HandlerStats::default() }
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl ProtocolHandler for NxdnHandler {
    fn protocol(&self) -> Protocol {
        Protocol::Nxdn
    }

    fn handle(&mut self, frame: &[u8]) {
        drop_frame(Protocol::Nxdn, &mut self.stats, frame);
    }

    fn stats(&self) -> HandlerStats {
        self.stats
    }
}
