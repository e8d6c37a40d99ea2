use ghost_config::CfgM17;
use ghost_core::Protocol;

use crate::handler_trait::{HandlerStats, ProtocolHandler, drop_frame};

pub struct M17Handler {
    /// Channel access number
    can: u8,
    stats: HandlerStats,
}

impl M17Handler {
    pub fn new(cfg: &CfgM17) -> Self {
        tracing::info!("M17 handler initialized, CAN {}", cfg.can);
        Self { can: cfg.can, stats: HandlerStats::default() }
    }

    pub fn can(&self) -> u8 {
        self.can
    }
}

impl ProtocolHandler for M17Handler {
    fn protocol(&self) -> Protocol {
        Protocol::M17
    }

    fn handle(&mut self, frame: &[u8]) {
        drop_frame(Protocol::M17, &mut self.stats, frame);
    }

    fn stats(&self) -> HandlerStats {
        self.stats
    }
}
