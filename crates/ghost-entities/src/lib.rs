pub mod frame_router;
pub mod handler_trait;

pub mod dmr;

pub mod ax25;
pub mod dstar;
pub mod m17;
pub mod nxdn;
pub mod pocsag;
pub mod ysf;

// Re-export commonly used items from router
pub use frame_router::FrameRouter;
pub use handler_trait::ProtocolHandler;
