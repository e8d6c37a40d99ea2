#![allow(dead_code)]

pub mod frames;
pub mod mock_lookup;

use ghost_config::{HostConfig, SharedConfig};

/// Creates a default config for testing. It can still be modified as needed
/// before passing it to `shared`
pub fn default_test_config() -> HostConfig {
    let mut cfg = HostConfig::default();
    cfg.general.callsign = "PD0TST".to_string();
    cfg.general.dmr_id = 2041234;
    cfg.general.timeout_secs = 10;
    cfg.dmr.color_code = 1;
    cfg
}

pub fn shared(cfg: HostConfig) -> SharedConfig {
    SharedConfig::from_config(cfg).unwrap()
}
