//! Persisted access-control rule records
//!
//! Rules are flat records keyed by identity and role, e.g. `(2041234, Blacklist)`.
//! The DMR access-control engine reads the complete record set at start-up and on
//! every reload, and builds its lookup sets from it.

use core::fmt;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::Value;

use ghost_core::DmrId;

/// Role of an access rule record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleRole {
    /// Source id is always rejected
    Blacklist,
    /// Source id is admitted; a non-empty whitelist is exhaustive
    Whitelist,
    /// Allowed id prefix (id / 10000)
    Prefix,
    /// Talk group admitted on time slot 1
    TgSlot1,
    /// Talk group admitted on time slot 2
    TgSlot2,
}

impl RuleRole {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "blacklist" => Some(RuleRole::Blacklist),
            "whitelist" => Some(RuleRole::Whitelist),
            "prefix" => Some(RuleRole::Prefix),
            "tg_slot1" => Some(RuleRole::TgSlot1),
            "tg_slot2" => Some(RuleRole::TgSlot2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessRule {
    pub id: DmrId,
    pub role: RuleRole,
}

impl AccessRule {
    pub fn new(id: DmrId, role: RuleRole) -> Self {
        Self { id, role }
    }

    /// Checks the record is usable by the access-control engine
    pub fn check(&self) -> Result<(), RuleStoreErr> {
        let reason = match self.role {
            RuleRole::Prefix if self.id == 0 || self.id > 999 => "prefix outside 1..=999",
            RuleRole::TgSlot1 | RuleRole::TgSlot2 if self.id == 0 => "talk group 0 is never valid",
            RuleRole::TgSlot1 | RuleRole::TgSlot2 if self.id > 0xFF_FFFF => "talk group exceeds 24 bits",
            RuleRole::Blacklist | RuleRole::Whitelist if self.id > 0xFF_FFFF => "radio id exceeds 24 bits",
            _ => return Ok(()),
        };
        Err(RuleStoreErr::Inconsistent { rule: *self, reason })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStoreErr {
    /// The backing store could not be read
    Unreachable { source: String, reason: String },
    /// The store was read but its content could not be parsed
    Malformed { reason: String },
    /// A record was parsed but is not a usable rule
    Inconsistent { rule: AccessRule, reason: &'static str },
}

impl fmt::Display for RuleStoreErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleStoreErr::Unreachable { source, reason } => write!(f, "rule store {} unreachable: {}", source, reason),
            RuleStoreErr::Malformed { reason } => write!(f, "malformed rule store: {}", reason),
            RuleStoreErr::Inconsistent { rule, reason } => {
                write!(f, "inconsistent rule {:?} for id {}: {}", rule.role, rule.id, reason)
            }
        }
    }
}

impl std::error::Error for RuleStoreErr {}

/// Source of persisted access rules
pub trait RuleStore: Send + Sync {
    /// Reads the complete rule set. Either all records are returned, or an error.
    fn load_rules(&self) -> Result<Vec<AccessRule>, RuleStoreErr>;

    /// Exact-match query on identity and role
    fn has_rule(&self, id: DmrId, role: RuleRole) -> Result<bool, RuleStoreErr> {
        Ok(self.load_rules()?.iter().any(|r| r.id == id && r.role == role))
    }
}

/// Rule store backed by a TOML file with one `[[rule]]` table per record
pub struct TomlRuleStore {
    path: PathBuf,
}

impl TomlRuleStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleStore for TomlRuleStore {
    fn load_rules(&self) -> Result<Vec<AccessRule>, RuleStoreErr> {
        let contents = fs::read_to_string(&self.path).map_err(|e| RuleStoreErr::Unreachable {
            source: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        let rules = parse_rules_toml(&contents)?;
        tracing::debug!("loaded {} rules from {}", rules.len(), self.path.display());
        Ok(rules)
    }
}

/// Parses the `[[rule]]` TOML format. Any malformed or inconsistent record fails the whole set.
pub fn parse_rules_toml(toml_str: &str) -> Result<Vec<AccessRule>, RuleStoreErr> {
    let root: RuleFileDto = toml::from_str(toml_str).map_err(|e| RuleStoreErr::Malformed { reason: e.to_string() })?;
    if !root.extra.is_empty() {
        let mut keys: Vec<&str> = root.extra.keys().map(|s| s.as_str()).collect();
        keys.sort_unstable();
        return Err(RuleStoreErr::Malformed {
            reason: format!("unrecognized top-level fields: {:?}", keys),
        });
    }

    let mut rules = Vec::with_capacity(root.rule.len());
    for dto in root.rule {
        if !dto.extra.is_empty() {
            return Err(RuleStoreErr::Malformed {
                reason: format!("unrecognized fields in rule for id {}", dto.id),
            });
        }
        let rule = AccessRule::new(dto.id, dto.role);
        rule.check()?;
        rules.push(rule);
    }
    Ok(rules)
}

/// In-memory rule store, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticRuleStore {
    rules: Vec<AccessRule>,
}

impl StaticRuleStore {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for StaticRuleStore {
    fn load_rules(&self) -> Result<Vec<AccessRule>, RuleStoreErr> {
        for rule in &self.rules {
            rule.check()?;
        }
        Ok(self.rules.clone())
    }
}

/// Textual access request of the form `"<id>,<role>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
    pub id: DmrId,
    pub role: RuleRole,
}

impl AccessRequest {
    pub fn parse(data: &[u8]) -> Result<Self, RuleStoreErr> {
        let text = std::str::from_utf8(data).map_err(|_| RuleStoreErr::Malformed {
            reason: "access request is not valid UTF-8".to_string(),
        })?;
        let Some((id, role)) = text.split_once(',') else {
            return Err(RuleStoreErr::Malformed {
                reason: format!("access request {:?} is not <id>,<role>", text),
            });
        };
        let id = id.trim().parse::<DmrId>().map_err(|e| RuleStoreErr::Malformed {
            reason: format!("access request id {:?}: {}", id, e),
        })?;
        let role = RuleRole::from_tag(role).ok_or_else(|| RuleStoreErr::Malformed {
            reason: format!("access request role {:?} unknown", role),
        })?;
        Ok(Self { id, role })
    }

    /// Admits the request only if the store holds an exactly matching record
    pub fn is_granted(&self, store: &dyn RuleStore) -> Result<bool, RuleStoreErr> {
        store.has_rule(self.id, self.role)
    }
}

#[derive(Deserialize)]
struct RuleFileDto {
    #[serde(default)]
    rule: Vec<RuleDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct RuleDto {
    id: DmrId,
    role: RuleRole,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
