mod common;

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::frames::{
    FIXED_POINT_HEADER_TG, FIXED_POINT_SRC_ID, FIXED_POINT_TG, burst_frame, data_header_frame, lc_burst_frame, voice_frame,
    wakeup_frame,
};
use common::mock_lookup::MockLookup;
use common::{default_test_config, shared};
use ghost_config::{AccessRule, RuleRole, StaticRuleStore, TomlRuleStore};
use ghost_core::{SlotNo, debug};
use ghost_entities::ProtocolHandler;
use ghost_entities::dmr::access_control::RuleSet;
use ghost_entities::dmr::components::slot_type::DataType;
use ghost_entities::dmr::csbk::CSBKO_BSDWNACT;
use ghost_entities::dmr::dmr_host::DmrStats;
use ghost_entities::dmr::slot::RfState;
use ghost_entities::dmr::{AccessControl, Control, DmrErr, DmrErrKind, DmrHost};

fn control_with(access: AccessControl) -> (Control, MockLookup) {
    let lookup = MockLookup::default();
    let control = Control::new(1, Duration::from_secs(10), Box::new(lookup.clone()), Arc::new(access));
    (control, lookup)
}

fn whitelist(ids: &[u32]) -> RuleSet {
    let mut rules = RuleSet::default();
    rules.whitelist.extend(ids);
    rules
}

#[test]
fn test_wakeup_whitelisted_source() {
    debug::setup_logging_verbose();
    let frame = wakeup_frame(FIXED_POINT_SRC_ID);
    assert_eq!(frame.len(), 33);

    let (control, lookup) = control_with(AccessControl::new(false, 0, whitelist(&[FIXED_POINT_SRC_ID])));
    let csbk = control.process_wakeup(&frame).unwrap();
    assert_eq!(csbk.csbko, CSBKO_BSDWNACT);
    assert_eq!(csbk.src_id, FIXED_POINT_SRC_ID);
    assert_eq!(lookup.resolved_ids(), vec![FIXED_POINT_SRC_ID]);

    let (control, lookup) = control_with(AccessControl::new(false, 0, whitelist(&[11111])));
    let err = control.process_wakeup(&frame).unwrap_err();
    assert_eq!(err, DmrErr::AccessDenied { src_id: FIXED_POINT_SRC_ID, dst_id: None });
    assert_eq!(err.kind(), DmrErrKind::AccessDenied);
    // Resolved for the log line even though the decision does not depend on it
    assert_eq!(lookup.resolved_ids(), vec![FIXED_POINT_SRC_ID]);
}

#[test]
fn test_wakeup_self_only_ignores_lists() {
    debug::setup_logging_verbose();
    let frame = wakeup_frame(FIXED_POINT_SRC_ID);

    let mut rules = RuleSet::default();
    rules.blacklist.insert(FIXED_POINT_SRC_ID);
    let (control, _) = control_with(AccessControl::new(true, FIXED_POINT_SRC_ID, rules));
    assert!(control.process_wakeup(&frame).is_ok());

    let (control, _) = control_with(AccessControl::new(true, 2041234, whitelist(&[FIXED_POINT_SRC_ID])));
    assert!(matches!(control.process_wakeup(&frame), Err(DmrErr::AccessDenied { .. })));
}

#[test]
fn test_blacklist_precedence_from_store() {
    debug::setup_logging_verbose();
    let store = StaticRuleStore::new(vec![
        AccessRule::new(FIXED_POINT_SRC_ID, RuleRole::Whitelist),
        AccessRule::new(FIXED_POINT_SRC_ID, RuleRole::Blacklist),
    ]);
    let access = AccessControl::from_store(false, 0, &store).unwrap();
    let (control, _) = control_with(access);
    assert!(matches!(control.process_wakeup(&wakeup_frame(FIXED_POINT_SRC_ID)), Err(DmrErr::AccessDenied { .. })));
}

#[test]
fn test_corrupt_wakeups_are_not_policy_errors() {
    debug::setup_logging_verbose();
    let (control, lookup) = control_with(AccessControl::new(false, 0, RuleSet::default()));

    let mut frame = wakeup_frame(FIXED_POINT_SRC_ID);
    frame.push(0x00);
    assert_eq!(control.process_wakeup(&frame).unwrap_err().kind(), DmrErrKind::Length);

    let mut frame = wakeup_frame(FIXED_POINT_SRC_ID);
    frame[1] = 0x02;
    assert_eq!(control.process_wakeup(&frame).unwrap_err().kind(), DmrErrKind::Framing);

    assert!(lookup.resolved_ids().is_empty());
}

#[test]
fn test_rule_reload_from_file() {
    debug::setup_logging_verbose();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    fs::write(&path, format!("[[rule]]\nid = {}\nrole = \"whitelist\"\n", FIXED_POINT_SRC_ID)).unwrap();

    let store = TomlRuleStore::new(&path);
    let access = Arc::new(AccessControl::from_store(false, 0, &store).unwrap());
    let control = Control::new(1, Duration::from_secs(10), Box::new(MockLookup::default()), Arc::clone(&access));
    let frame = wakeup_frame(FIXED_POINT_SRC_ID);
    assert!(control.process_wakeup(&frame).is_ok());

    // Replacing the whitelist takes effect for the next frame
    fs::write(&path, "[[rule]]\nid = 11111\nrole = \"whitelist\"\n").unwrap();
    access.reload_rules(&store).unwrap();
    assert!(matches!(control.process_wakeup(&frame), Err(DmrErr::AccessDenied { .. })));

    // A broken store keeps the rules that were in effect
    fs::write(&path, "[[rule]]\nid = 11111\nrole = \"greylist\"\n").unwrap();
    assert!(access.reload_rules(&store).is_err());
    assert!(access.snapshot().whitelist.contains(&11111));
    fs::remove_file(&path).unwrap();
    assert!(access.reload_rules(&store).is_err());
    assert!(matches!(control.process_wakeup(&frame), Err(DmrErr::AccessDenied { .. })));
}

#[test]
fn test_dmr_host_dispatch() {
    debug::setup_logging_verbose();
    let mut rules = RuleSet::default();
    rules.tg_slot2.insert(91);
    let access = Arc::new(AccessControl::new(false, 0, rules));
    let mut host = DmrHost::new(shared(default_test_config()), access, Box::new(MockLookup::default()));

    host.handle(&wakeup_frame(FIXED_POINT_SRC_ID));
    host.handle(&data_header_frame(SlotNo::Two, true, 91, 2041234));
    host.handle(&data_header_frame(SlotNo::Two, true, 92, 2041234));
    host.handle(&burst_frame(SlotNo::One, 1, DataType::Rate12Data));
    host.handle(&burst_frame(SlotNo::One, 3, DataType::Rate12Data));
    host.handle(&[0x00]);

    assert_eq!(
        host.dmr_stats(),
        DmrStats { frames: 6, accepted: 3, denied: 1, corrupt: 2, unsupported: 0 }
    );
    assert_eq!(host.stats().dropped, 3);
    assert_eq!(host.control().slot(SlotNo::Two).rf_state(), RfState::Rejected);
}

#[test]
fn test_dmr_host_tick_resets_slots() {
    debug::setup_logging_verbose();
    let access = Arc::new(AccessControl::new(false, 0, RuleSet::default()));
    let mut host = DmrHost::new(shared(default_test_config()), access, Box::new(MockLookup::default()));

    host.handle(&data_header_frame(SlotNo::One, false, 2042000, 2041234));
    assert_eq!(host.control().slot(SlotNo::One).rf_state(), RfState::Data);

    host.tick(Instant::now());
    assert_eq!(host.control().slot(SlotNo::One).rf_state(), RfState::Data);
    host.tick(Instant::now() + Duration::from_secs(11));
    assert!(host.control().slot(SlotNo::One).is_idle());
}

#[test]
fn test_dmr_host_voice_call() {
    debug::setup_logging_verbose();
    let mut rules = RuleSet::default();
    rules.tg_slot1.insert(FIXED_POINT_TG);
    let access = Arc::new(AccessControl::new(false, 0, rules));
    let lookup = MockLookup::default();
    let mut host = DmrHost::new(shared(default_test_config()), access, Box::new(lookup.clone()));

    host.handle(&lc_burst_frame(SlotNo::One, FIXED_POINT_TG, DataType::VoiceLcHeader));
    for seq in 0..6 {
        host.handle(&voice_frame(SlotNo::One, seq));
    }
    let slot = host.control().slot(SlotNo::One);
    assert_eq!(slot.rf_state(), RfState::Audio);
    assert_eq!(slot.embedded_lc().map(|lc| lc.dst_id), Some(FIXED_POINT_TG));
    assert_eq!(slot.queued_len(), 6 * 27);
    assert_eq!(slot.embedded_data(), Some(&[0x15u8; 6][..]));
    assert!(lookup.resolved_ids().contains(&FIXED_POINT_SRC_ID));

    host.handle(&lc_burst_frame(SlotNo::One, FIXED_POINT_TG, DataType::TerminatorWithLc));
    assert!(host.control().slot(SlotNo::One).is_idle());

    // Talk group not in the slot 1 list
    host.handle(&lc_burst_frame(SlotNo::One, FIXED_POINT_HEADER_TG, DataType::VoiceLcHeader));
    host.handle(&voice_frame(SlotNo::One, 0));
    let slot = host.control().slot(SlotNo::One);
    assert_eq!(slot.rf_state(), RfState::Rejected);
    assert_eq!(slot.queued_len(), 0);

    assert_eq!(
        host.dmr_stats(),
        DmrStats { frames: 10, accepted: 9, denied: 1, corrupt: 0, unsupported: 0 }
    );
}

#[test]
fn test_dmr_host_embedded_lc_only() {
    debug::setup_logging_verbose();
    let mut cfg = default_test_config();
    cfg.dmr.embedded_lc_only = true;
    let access = Arc::new(AccessControl::new(false, 0, RuleSet::default()));
    let mut host = DmrHost::new(shared(cfg), access, Box::new(MockLookup::default()));

    host.handle(&lc_burst_frame(SlotNo::Two, FIXED_POINT_TG, DataType::VoiceLcHeader));
    host.handle(&voice_frame(SlotNo::Two, 1));
    let slot = host.control().slot(SlotNo::Two);
    assert_eq!(slot.rf_state(), RfState::Audio);
    assert!(slot.embedded_lc().is_none());
    assert_eq!(slot.embedded_data(), Some(&[0x11u8; 6][..]));
}
