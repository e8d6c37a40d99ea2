use std::collections::HashMap;
use std::time::Instant;

use ghost_config::SharedConfig;
use ghost_core::Protocol;

use crate::ProtocolHandler;

pub struct FrameRouter {
    config: SharedConfig,
    handlers: HashMap<Protocol, Box<dyn ProtocolHandler>>,
    /// Frames for protocols without a registered handler
    unrouted: u64,
}

impl FrameRouter {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
            unrouted: 0,
        }
    }

    /// Registers `handler` unless its protocol is disabled in the config.
    /// Returns whether the handler was registered.
    pub fn register_handler(&mut self, handler: Box<dyn ProtocolHandler>) -> bool {
        let protocol = handler.protocol();
        if !self.config.config().is_enabled(protocol) {
            tracing::debug!("register_handler: {} disabled, not registering", protocol);
            return false;
        }
        tracing::debug!("register_handler {}", protocol);
        if self.handlers.insert(protocol, handler).is_some() {
            tracing::warn!("register_handler: replaced existing {} handler", protocol);
        }
        true
    }

    /// Returns a mut ref to the handler for the requested protocol
    pub fn get_handler(&mut self, protocol: Protocol) -> Option<&mut dyn ProtocolHandler> {
        self.handlers.get_mut(&protocol).map(|handler| handler.as_mut())
    }

    pub fn has_handler(&self, protocol: Protocol) -> bool {
        self.handlers.contains_key(&protocol)
    }

    /// Delivers a frame to its protocol handler. Returns false if there is none.
    pub fn dispatch(&mut self, protocol: Protocol, frame: &[u8]) -> bool {
        match self.handlers.get_mut(&protocol) {
            Some(handler) => {
                tracing::trace!("dispatch {} frame {:02x?}", protocol, frame);
                handler.handle(frame);
                true
            }
            None => {
                self.unrouted += 1;
                tracing::warn!("dispatch: no handler for {}, dropping {} bytes", protocol, frame.len());
                false
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        for handler in self.handlers.values_mut() {
            handler.tick(now);
        }
    }

    pub fn unrouted(&self) -> u64 {
        self.unrouted
    }
}
