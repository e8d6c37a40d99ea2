//! Source and talk group admission for decoded DMR traffic
//!
//! Validation reads an immutable [`RuleSet`] snapshot. Updates build a new
//! set and publish it by swapping the snapshot reference, so a validation in
//! flight keeps seeing the set it started with. Writers are serialized.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use ghost_config::{AccessRule, RuleRole, RuleStore, RuleStoreErr};
use ghost_core::{DmrId, SlotNo};

/// Largest valid id prefix (`id / 10000`)
pub const MAX_PREFIX: u32 = 999;
const PREFIX_DIVISOR: u32 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub blacklist: HashSet<DmrId>,
    pub whitelist: HashSet<DmrId>,
    pub prefixes: HashSet<u32>,
    pub tg_slot1: HashSet<DmrId>,
    pub tg_slot2: HashSet<DmrId>,
}

impl RuleSet {
    /// Builds a rule set from persisted records. Fails on the first unusable record.
    pub fn from_rules(rules: &[AccessRule]) -> Result<Self, RuleStoreErr> {
        let mut set = RuleSet::default();
        for rule in rules {
            rule.check()?;
            let target = match rule.role {
                RuleRole::Blacklist => &mut set.blacklist,
                RuleRole::Whitelist => &mut set.whitelist,
                RuleRole::Prefix => &mut set.prefixes,
                RuleRole::TgSlot1 => &mut set.tg_slot1,
                RuleRole::TgSlot2 => &mut set.tg_slot2,
            };
            target.insert(rule.id);
        }
        Ok(set)
    }

    fn tg_whitelist(&self, slot: SlotNo) -> &HashSet<DmrId> {
        match slot {
            SlotNo::One => &self.tg_slot1,
            SlotNo::Two => &self.tg_slot2,
        }
    }
}

/// Local id as compared in self-only mode. Ids with a one or two digit
/// suffix (8 or 9 digits) are cut back to the 7-digit radio id.
pub fn truncate_local_id(id: DmrId) -> DmrId {
    match id {
        100_000_000.. => id / 100,
        10_000_000.. => id / 10,
        _ => id,
    }
}

pub struct AccessControl {
    self_only: bool,
    local_id: DmrId,
    rules: RwLock<Arc<RuleSet>>,
    writer: Mutex<()>,
}

impl AccessControl {
    pub fn new(self_only: bool, local_id: DmrId, rules: RuleSet) -> Self {
        Self {
            self_only,
            local_id,
            rules: RwLock::new(Arc::new(rules)),
            writer: Mutex::new(()),
        }
    }

    /// Builds the engine from the complete content of `store`
    pub fn from_store(self_only: bool, local_id: DmrId, store: &dyn RuleStore) -> Result<Self, RuleStoreErr> {
        let rules = RuleSet::from_rules(&store.load_rules()?)?;
        Ok(Self::new(self_only, local_id, rules))
    }

    pub fn self_only(&self) -> bool {
        self.self_only
    }

    /// Current rule snapshot. Later updates do not affect the returned set.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rules.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, rules: RuleSet) {
        *self.rules.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(rules);
    }

    /// Applies `f` to a copy of the current set and publishes the result
    fn update_with(&self, f: impl FnOnce(&mut RuleSet)) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RuleSet::clone(&self.snapshot());
        f(&mut next);
        self.publish(next);
    }

    pub fn validate_source(&self, id: DmrId) -> bool {
        if self.self_only {
            return id == truncate_local_id(self.local_id);
        }

        let rules = self.snapshot();
        if rules.blacklist.contains(&id) {
            return false;
        }

        let prefix = id / PREFIX_DIVISOR;
        if prefix == 0 || prefix > MAX_PREFIX {
            return false;
        }
        if !rules.prefixes.is_empty() && !rules.prefixes.contains(&prefix) {
            return false;
        }

        rules.whitelist.is_empty() || rules.whitelist.contains(&id)
    }

    pub fn validate_talkgroup(&self, slot: SlotNo, is_group: bool, id: DmrId) -> bool {
        if !is_group {
            return true;
        }
        if id == 0 {
            return false;
        }
        let rules = self.snapshot();
        let whitelist = rules.tg_whitelist(slot);
        whitelist.is_empty() || whitelist.contains(&id)
    }

    /// Replaces the blacklist as a whole
    pub fn update_blacklist(&self, ids: impl IntoIterator<Item = DmrId>) {
        let ids: HashSet<DmrId> = ids.into_iter().collect();
        tracing::info!("blacklist updated, {} entries", ids.len());
        self.update_with(|rules| rules.blacklist = ids);
    }

    /// Replaces the whitelist as a whole
    pub fn update_whitelist(&self, ids: impl IntoIterator<Item = DmrId>) {
        let ids: HashSet<DmrId> = ids.into_iter().collect();
        tracing::info!("whitelist updated, {} entries", ids.len());
        self.update_with(|rules| rules.whitelist = ids);
    }

    /// Re-reads all rules from `store`. On any failure the current rules stay in effect.
    pub fn reload_rules(&self, store: &dyn RuleStore) -> Result<(), RuleStoreErr> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let loaded = store.load_rules().and_then(|rules| RuleSet::from_rules(&rules));
        match loaded {
            Ok(next) => {
                tracing::info!(
                    "rules reloaded: {} blacklisted, {} whitelisted, {} prefixes, {}/{} talk groups",
                    next.blacklist.len(),
                    next.whitelist.len(),
                    next.prefixes.len(),
                    next.tg_slot1.len(),
                    next.tg_slot2.len()
                );
                self.publish(next);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("rule reload failed, keeping previous rules: {}", e);
                Err(e)
            }
        }
    }
}
