use ghost_config::CfgPortProtocol;
use ghost_core::Protocol;

use crate::handler_trait::{HandlerStats, ProtocolHandler, drop_frame};

pub struct YsfHandler {
    port: String,
    stats: HandlerStats,
}

impl YsfHandler {
    pub fn new(cfg: &CfgPortProtocol) -> Self {
        tracing::info!("YSF handler initialized on port {:?}", cfg.port);
        Self { port: cfg.port.clone(), stats: HandlerStats::default() }
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl ProtocolHandler for YsfHandler {
    fn protocol(&self) -> Protocol {
        Protocol::Ysf
    }

    fn handle(&mut self, frame: &[u8]) {
        drop_frame(Protocol::Ysf, &mut self.stats, frame);
    }

    fn stats(&self) -> HandlerStats {
        self.stats
    }
}
