use std::sync::Arc;

use ghost_core::Protocol;

#[derive(Debug, Clone)]
pub struct CfgGeneral {
    pub callsign: String,
    /// Local station DMR id. May carry a one or two digit suffix (8 or 9 digits)
    pub dmr_id: u32,
    /// Slot inactivity timeout, in seconds
    pub timeout_secs: u32,
    pub duplex: bool,
    pub rf_mode_hang_secs: u32,
    pub net_mode_hang_secs: u32,
}

impl Default for CfgGeneral {
    fn default() -> Self {
        Self {
            callsign: "NOCALL".to_string(),
            dmr_id: 0,
            timeout_secs: 60,
            duplex: false,
            rf_mode_hang_secs: 10,
            net_mode_hang_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CfgDmr {
    pub enable: bool,
    /// 4 bits, carried in every slot type field
    pub color_code: u8,
    pub beacons: bool,
    /// Only admit the local station id, ignoring all access lists
    pub self_only: bool,
    pub embedded_lc_only: bool,
    pub dump_ta_data: bool,
}

impl Default for CfgDmr {
    fn default() -> Self {
        Self {
            enable: true,
            color_code: 1,
            beacons: false,
            self_only: false,
            embedded_lc_only: false,
            dump_ta_data: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CfgDStar {
    pub enable: bool,
    /// Repeater module letter, A..=E
    pub module: char,
}

impl Default for CfgDStar {
    fn default() -> Self {
        Self { enable: true, module: 'C' }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CfgM17 {
    pub enable: bool,
    /// Channel access number, 4 bits
    pub can: u8,
}

/// Shared shape of the AX.25, NXDN and YSF sections
#[derive(Debug, Clone, Default)]
pub struct CfgPortProtocol {
    pub enable: bool,
    pub port: String,
}

#[derive(Debug, Clone, Default)]
pub struct CfgPocsag {
    pub enable: bool,
    /// Transmit frequency in Hz
    pub frequency: u32,
}

#[derive(Debug, Clone)]
pub struct CfgAccessControl {
    /// TOML file with persisted access rules. No file means no rules.
    pub rules_file: Option<String>,
    /// DMR id to callsign table, used for log output only
    pub id_lookup_file: Option<String>,
    /// Interval between rule reloads, in seconds. 0 disables periodic reload.
    pub reload_secs: u64,
}

impl Default for CfgAccessControl {
    fn default() -> Self {
        Self {
            rules_file: None,
            id_lookup_file: None,
            reload_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub debug_log: Option<String>,
    pub general: CfgGeneral,
    pub dmr: CfgDmr,
    pub dstar: CfgDStar,
    pub m17: CfgM17,
    pub ax25: CfgPortProtocol,
    pub nxdn: CfgPortProtocol,
    pub pocsag: CfgPocsag,
    pub ysf: CfgPortProtocol,
    pub access_control: CfgAccessControl,
}

impl HostConfig {
    /// Validate that all configuration fields are within range.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.general.timeout_secs == 0 {
            return Err("general.timeout must be at least 1 second");
        }
        if self.general.dmr_id > 999_999_999 {
            return Err("general.dmr_id has more than 9 digits");
        }

        if self.dmr.color_code > 15 {
            return Err("dmr.color_code must be in 0..=15");
        }
        if self.dmr.enable && self.dmr.self_only && self.general.dmr_id == 0 {
            return Err("dmr.self_only requires general.dmr_id to be set");
        }

        if !('A'..='E').contains(&self.dstar.module) {
            return Err("dstar.module must be a letter A..=E");
        }
        if self.m17.can > 15 {
            return Err("m17.can must be in 0..=15");
        }
        if self.pocsag.enable && self.pocsag.frequency == 0 {
            return Err("pocsag.frequency must be set when pocsag is enabled");
        }
        Ok(())
    }

    /// Whether frames for `protocol` should be handled at all
    pub fn is_enabled(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Dmr => self.dmr.enable,
            Protocol::DStar => self.dstar.enable,
            Protocol::M17 => self.m17.enable,
            Protocol::Ax25 => self.ax25.enable,
            Protocol::Nxdn => self.nxdn.enable,
            Protocol::Pocsag => self.pocsag.enable,
            Protocol::Ysf => self.ysf.enable,
        }
    }
}

/// Immutable, validated host configuration shared between handlers.
#[derive(Clone)]
pub struct SharedConfig {
    cfg: Arc<HostConfig>,
}

impl SharedConfig {
    pub fn from_config(cfg: HostConfig) -> Result<Self, &'static str> {
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<HostConfig> {
        Arc::clone(&self.cfg)
    }
}
