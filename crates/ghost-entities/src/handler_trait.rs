use std::time::Instant;

use as_any::AsAny;
use ghost_core::Protocol;

/// Frame counters kept by every handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Frames handed to the handler
    pub frames: u64,
    /// Frames that were malformed, refused or not processed at all
    pub dropped: u64,
}

/// Trait for protocol handlers
/// Used by FrameRouter for passing modem frames to the right protocol
pub trait ProtocolHandler: Send + AsAny {
    /// Returns the protocol this handler consumes
    fn protocol(&self) -> Protocol;

    /// Handle one raw frame. Malformed input is logged and dropped.
    fn handle(&mut self, frame: &[u8]);

    /// Periodic housekeeping (optional)
    fn tick(&mut self, _now: Instant) {}

    fn stats(&self) -> HandlerStats;
}

/// Shared behaviour of handlers that only account for and drop their frames
pub(crate) fn drop_frame(protocol: Protocol, stats: &mut HandlerStats, frame: &[u8]) {
    stats.frames += 1;
    stats.dropped += 1;
    if frame.is_empty() {
        tracing::warn!("{}: empty frame", protocol);
    } else {
        tracing::debug!("{}: dropping {} byte frame", protocol, frame.len());
    }
}
