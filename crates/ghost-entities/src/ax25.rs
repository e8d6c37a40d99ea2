use ghost_config::CfgPortProtocol;
use ghost_core::Protocol;

use crate::handler_trait::{HandlerStats, ProtocolHandler, drop_frame};

pub struct Ax25Handler {
    port: String,
    stats: HandlerStats,
}

impl Ax25Handler {
    pub fn new(cfg: &CfgPortProtocol) -> Self {
        tracing::info!("AX.25 handler initialized on port {:?}", cfg.port);
        Self { port: cfg.port.clone(), stats: HandlerStats::default() }
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl ProtocolHandler for Ax25Handler {
    fn protocol(&self) -> Protocol {
        Protocol::Ax25
    }

    fn handle(&mut self, frame: &[u8]) {
        drop_frame(Protocol::Ax25, &mut self.stats, frame);
    }

    fn stats(&self) -> HandlerStats {
        self.stats
    }
}
