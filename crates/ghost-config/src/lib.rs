//! Host configuration management
//!
//! This crate provides configuration loading and parsing for the host:
//! - TOML configuration file parsing
//! - Host configuration structures, one section per protocol
//! - Persisted access-control rule records

pub mod host_config;
pub mod rule_store;
pub mod toml_config;

pub use host_config::*;
pub use rule_store::*;
pub use toml_config::*;
