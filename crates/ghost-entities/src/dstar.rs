use ghost_config::CfgDStar;
use ghost_core::Protocol;

use crate::handler_trait::{HandlerStats, ProtocolHandler, drop_frame};

/// Accepts D-Star frames for the configured module. Frames are not decoded yet.
pub struct DStarHandler {
    module: char,
    stats: HandlerStats,
}

impl DStarHandler {
    pub fn new(cfg: &CfgDStar) -> Self {
        tracing::info!("D-Star handler initialized, module {}", cfg.module);
        Self { module: cfg.module, stats: HandlerStats::default() }
    }

    pub fn module(&self) -> char {
        self.module
    }
}

impl ProtocolHandler for DStarHandler {
    fn protocol(&self) -> Protocol {
        Protocol::DStar
    }

    fn handle(&mut self, frame: &[u8]) {
        drop_frame(Protocol::DStar, &mut self.stats, frame);
    }

    fn stats(&self) -> HandlerStats {
        self.stats
    }
}
