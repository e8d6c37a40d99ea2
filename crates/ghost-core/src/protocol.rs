use core::fmt;

use serde::Deserialize;

/// Digital voice / data protocols a modem may deliver frames for
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Digital Mobile Radio, ETSI TS 102 361
    Dmr,
    /// JARL D-Star
    DStar,
    /// M17 open protocol
    M17,
    /// AX.25 packet radio
    Ax25,
    /// NXDN (Kenwood/Icom)
    Nxdn,
    /// POCSAG paging
    Pocsag,
    /// Yaesu System Fusion
    Ysf,
}

impl Protocol {
    pub const ALL: [Protocol; 7] = [
        Protocol::Dmr,
        Protocol::DStar,
        Protocol::M17,
        Protocol::Ax25,
        Protocol::Nxdn,
        Protocol::Pocsag,
        Protocol::Ysf,
    ];

    /// Parses the lowercase protocol tag used in capture files
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "dmr" => Some(Protocol::Dmr),
            "dstar" => Some(Protocol::DStar),
            "m17" => Some(Protocol::M17),
            "ax25" => Some(Protocol::Ax25),
            "nxdn" => Some(Protocol::Nxdn),
            "pocsag" => Some(Protocol::Pocsag),
            "ysf" => Some(Protocol::Ysf),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Dmr => "DMR",
            Protocol::DStar => "D-Star",
            Protocol::M17 => "M17",
            Protocol::Ax25 => "AX.25",
            Protocol::Nxdn => "NXDN",
            Protocol::Pocsag => "POCSAG",
            Protocol::Ysf => "YSF",
        };
        f.write_str(s)
    }
}
