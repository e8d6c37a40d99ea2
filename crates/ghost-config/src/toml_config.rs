use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::host_config::{CfgAccessControl, CfgDStar, CfgDmr, CfgGeneral, CfgPocsag, CfgPortProtocol, HostConfig, SharedConfig};

const EXPECTED_CONFIG_VERSION: &str = "0.1";

/// Build `SharedConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    if root.config_version != EXPECTED_CONFIG_VERSION {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, EXPECTED_CONFIG_VERSION
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    check_extra("general", root.general.as_ref().map(|s| &s.extra))?;
    check_extra("dmr", root.dmr.as_ref().map(|s| &s.extra))?;
    check_extra("dstar", root.dstar.as_ref().map(|s| &s.extra))?;
    check_extra("m17", root.m17.as_ref().map(|s| &s.extra))?;
    check_extra("ax25", root.ax25.as_ref().map(|s| &s.extra))?;
    check_extra("nxdn", root.nxdn.as_ref().map(|s| &s.extra))?;
    check_extra("pocsag", root.pocsag.as_ref().map(|s| &s.extra))?;
    check_extra("ysf", root.ysf.as_ref().map(|s| &s.extra))?;
    check_extra("access_control", root.access_control.as_ref().map(|s| &s.extra))?;

    let mut cfg = HostConfig {
        debug_log: root.debug_log,
        ..Default::default()
    };

    if let Some(g) = root.general {
        apply_general_patch(&mut cfg.general, g);
    }
    if let Some(d) = root.dmr {
        apply_dmr_patch(&mut cfg.dmr, d);
    }
    if let Some(d) = root.dstar {
        apply_dstar_patch(&mut cfg.dstar, d)?;
    }
    if let Some(m) = root.m17 {
        patch(&mut cfg.m17.enable, m.enable);
        patch(&mut cfg.m17.can, m.can);
    }
    if let Some(p) = root.ax25 {
        apply_port_patch(&mut cfg.ax25, p);
    }
    if let Some(p) = root.nxdn {
        apply_port_patch(&mut cfg.nxdn, p);
    }
    if let Some(p) = root.pocsag {
        apply_pocsag_patch(&mut cfg.pocsag, p);
    }
    if let Some(p) = root.ysf {
        apply_port_patch(&mut cfg.ysf, p);
    }
    if let Some(ac) = root.access_control {
        apply_access_control_patch(&mut cfg.access_control, ac);
    }

    Ok(SharedConfig::from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f))
}

#[inline]
fn patch<T>(dst: &mut T, src: Option<T>) {
    if let Some(v) = src {
        *dst = v;
    }
}

fn check_extra(section: &str, extra: Option<&HashMap<String, Value>>) -> Result<(), String> {
    match extra {
        Some(extra) if !extra.is_empty() => Err(format!("Unrecognized fields in {}: {:?}", section, sorted_keys(extra))),
        _ => Ok(()),
    }
}

fn apply_general_patch(dst: &mut CfgGeneral, src: GeneralDto) {
    patch(&mut dst.callsign, src.callsign);
    patch(&mut dst.dmr_id, src.dmr_id);
    patch(&mut dst.timeout_secs, src.timeout);
    patch(&mut dst.duplex, src.duplex);
    patch(&mut dst.rf_mode_hang_secs, src.rf_mode_hang);
    patch(&mut dst.net_mode_hang_secs, src.net_mode_hang);
}

fn apply_dmr_patch(dst: &mut CfgDmr, src: DmrDto) {
    patch(&mut dst.enable, src.enable);
    patch(&mut dst.color_code, src.color_code);
    patch(&mut dst.beacons, src.beacons);
    patch(&mut dst.self_only, src.self_only);
    patch(&mut dst.embedded_lc_only, src.embedded_lc_only);
    patch(&mut dst.dump_ta_data, src.dump_ta_data);
}

fn apply_dstar_patch(dst: &mut CfgDStar, src: DStarDto) -> Result<(), String> {
    patch(&mut dst.enable, src.enable);
    if let Some(module) = src.module {
        let mut chars = module.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => dst.module = c.to_ascii_uppercase(),
            _ => return Err(format!("dstar.module must be a single letter, got {:?}", module)),
        }
    }
    Ok(())
}

fn apply_port_patch(dst: &mut CfgPortProtocol, src: PortProtocolDto) {
    patch(&mut dst.enable, src.enable);
    patch(&mut dst.port, src.port);
}

fn apply_pocsag_patch(dst: &mut CfgPocsag, src: PocsagDto) {
    patch(&mut dst.enable, src.enable);
    patch(&mut dst.frequency, src.frequency);
}

fn apply_access_control_patch(dst: &mut CfgAccessControl, src: AccessControlDto) {
    dst.rules_file = src.rules_file;
    dst.id_lookup_file = src.id_lookup_file;
    patch(&mut dst.reload_secs, src.reload_secs);
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    #[serde(default)]
    general: Option<GeneralDto>,
    #[serde(default)]
    dmr: Option<DmrDto>,
    #[serde(default)]
    dstar: Option<DStarDto>,
    #[serde(default)]
    m17: Option<M17Dto>,
    #[serde(default)]
    ax25: Option<PortProtocolDto>,
    #[serde(default)]
    nxdn: Option<PortProtocolDto>,
    #[serde(default)]
    pocsag: Option<PocsagDto>,
    #[serde(default)]
    ysf: Option<PortProtocolDto>,
    #[serde(default)]
    access_control: Option<AccessControlDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct GeneralDto {
    callsign: Option<String>,
    dmr_id: Option<u32>,
    timeout: Option<u32>,
    duplex: Option<bool>,
    rf_mode_hang: Option<u32>,
    net_mode_hang: Option<u32>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct DmrDto {
    enable: Option<bool>,
    color_code: Option<u8>,
    beacons: Option<bool>,
    self_only: Option<bool>,
    embedded_lc_only: Option<bool>,
    dump_ta_data: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct DStarDto {
    enable: Option<bool>,
    module: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct M17Dto {
    enable: Option<bool>,
    can: Option<u8>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct PortProtocolDto {
    enable: Option<bool>,
    port: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct PocsagDto {
    enable: Option<bool>,
    frequency: Option<u32>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct AccessControlDto {
    rules_file: Option<String>,
    id_lookup_file: Option<String>,
    reload_secs: Option<u64>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_core::Protocol;

    const FULL_CONFIG: &str = r#"
config_version = "0.1"
debug_log = "ghost-debug.log"

[general]
callsign = "PD0ABC"
dmr_id = 204123401
timeout = 180
duplex = true

[dmr]
enable = true
color_code = 3
self_only = true

[dstar]
module = "b"

[m17]
enable = false
can = 7

[pocsag]
enable = true
frequency = 439987500

[ysf]
port = "ysf0"

[access_control]
rules_file = "rules.toml"
reload_secs = 300
"#;

    #[test]
    fn test_full_config() {
        let cfg = from_toml_str(FULL_CONFIG).unwrap().config();
        assert_eq!(cfg.debug_log.as_deref(), Some("ghost-debug.log"));
        assert_eq!(cfg.general.callsign, "PD0ABC");
        assert_eq!(cfg.general.dmr_id, 204123401);
        assert_eq!(cfg.general.timeout_secs, 180);
        assert!(cfg.general.duplex);
        assert_eq!(cfg.general.rf_mode_hang_secs, 10);
        assert_eq!(cfg.dmr.color_code, 3);
        assert!(cfg.dmr.self_only);
        assert_eq!(cfg.dstar.module, 'B');
        assert!(!cfg.m17.enable);
        assert_eq!(cfg.m17.can, 7);
        assert_eq!(cfg.pocsag.frequency, 439_987_500);
        assert_eq!(cfg.ysf.port, "ysf0");
        assert_eq!(cfg.access_control.rules_file.as_deref(), Some("rules.toml"));
        assert_eq!(cfg.access_control.reload_secs, 300);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = from_toml_str("config_version = \"0.1\"\n").unwrap().config();
        assert_eq!(cfg.general.callsign, "NOCALL");
        assert_eq!(cfg.dmr.color_code, 1);
        assert_eq!(cfg.dstar.module, 'C');
        assert!(cfg.access_control.rules_file.is_none());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = from_toml_str("config_version = \"0.1\"\nfoo = 1\n").err().unwrap();
        assert!(err.to_string().contains("foo"));

        let err = from_toml_str("config_version = \"0.1\"\n[dmr]\ncolour_code = 1\n").err().unwrap();
        assert!(err.to_string().contains("dmr"));
        assert!(err.to_string().contains("colour_code"));
    }

    #[test]
    fn test_rejects_bad_version_and_ranges() {
        assert!(from_toml_str("config_version = \"0.5\"\n").is_err());
        assert!(from_toml_str("config_version = \"0.1\"\n[dmr]\ncolor_code = 16\n").is_err());
        assert!(from_toml_str("config_version = \"0.1\"\n[dstar]\nmodule = \"AB\"\n").is_err());
    }

    #[test]
    fn test_shipped_config_loads() {
        let cfg = from_toml_str(include_str!("../../../config/ghost.toml")).unwrap().config();
        assert_eq!(cfg.general.dmr_id, 2041234);
        assert!(cfg.is_enabled(Protocol::Dmr));
        assert!(!cfg.is_enabled(Protocol::M17));
        assert_eq!(cfg.access_control.rules_file.as_deref(), Some("config/rules.toml"));
    }
}
