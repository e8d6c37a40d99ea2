mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::frames::{FIXED_POINT_SRC_ID, data_header_frame, wakeup_frame};
use common::mock_lookup::MockLookup;
use common::{default_test_config, shared};
use ghost_config::HostConfig;
use ghost_core::{Protocol, SlotNo, debug};
use ghost_entities::ax25::Ax25Handler;
use ghost_entities::dmr::access_control::RuleSet;
use ghost_entities::dmr::slot::RfState;
use ghost_entities::dmr::{AccessControl, DmrHost};
use ghost_entities::dstar::DStarHandler;
use ghost_entities::handler_trait::HandlerStats;
use ghost_entities::m17::M17Handler;
use ghost_entities::nxdn::NxdnHandler;
use ghost_entities::pocsag::PocsagHandler;
use ghost_entities::ysf::YsfHandler;
use ghost_entities::{FrameRouter, ProtocolHandler};

fn build_router(cfg: HostConfig) -> FrameRouter {
    let config = shared(cfg);
    let c = config.config();
    let access = Arc::new(AccessControl::new(false, 0, RuleSet::default()));
    let handlers: Vec<Box<dyn ProtocolHandler>> = vec![
        Box::new(DmrHost::new(config.clone(), access, Box::new(MockLookup::default()))),
        Box::new(DStarHandler::new(&c.dstar)),
        Box::new(M17Handler::new(&c.m17)),
        Box::new(Ax25Handler::new(&c.ax25)),
        Box::new(NxdnHandler::new(&c.nxdn)),
        Box::new(PocsagHandler::new(&c.pocsag)),
        Box::new(YsfHandler::new(&c.ysf)),
    ];
    let mut router = FrameRouter::new(config);
    for handler in handlers {
        router.register_handler(handler);
    }
    router
}

#[test]
fn test_only_enabled_handlers_registered() {
    debug::setup_logging_verbose();
    let mut cfg = default_test_config();
    cfg.m17.enable = true;
    cfg.dstar.enable = false;
    let router = build_router(cfg);

    assert!(router.has_handler(Protocol::Dmr));
    assert!(router.has_handler(Protocol::M17));
    assert!(!router.has_handler(Protocol::DStar));
    assert!(!router.has_handler(Protocol::Pocsag));
    assert!(!router.has_handler(Protocol::Ysf));
}

#[test]
fn test_dispatch_by_protocol() {
    debug::setup_logging_verbose();
    let mut cfg = default_test_config();
    cfg.ysf.enable = true;
    cfg.ysf.port = "/dev/ttyUSB1".to_string();
    let mut router = build_router(cfg);

    assert!(router.dispatch(Protocol::Dmr, &wakeup_frame(FIXED_POINT_SRC_ID)));
    assert!(router.dispatch(Protocol::Ysf, &[0xd4, 0x71, 0xc9, 0x63]));
    assert!(router.dispatch(Protocol::Ysf, &[]));
    assert!(router.dispatch(Protocol::DStar, &[0x55; 12]));
    assert!(!router.dispatch(Protocol::Nxdn, &[0x01, 0x02]));
    assert_eq!(router.unrouted(), 1);

    let dmr = router.get_handler(Protocol::Dmr).unwrap();
    assert_eq!(dmr.stats(), HandlerStats { frames: 1, dropped: 0 });
    let ysf = router.get_handler(Protocol::Ysf).unwrap();
    assert_eq!(ysf.stats(), HandlerStats { frames: 2, dropped: 2 });
}

#[test]
fn test_router_tick_drives_slot_timeouts() {
    debug::setup_logging_verbose();
    let mut router = build_router(default_test_config());
    let start = Instant::now();

    router.dispatch(Protocol::Dmr, &data_header_frame(SlotNo::Two, false, 2042000, 2041234));
    router.tick(start + Duration::from_secs(1));
    let host = router.get_handler(Protocol::Dmr).unwrap().as_any_mut().downcast_mut::<DmrHost>().unwrap();
    assert_eq!(host.control().slot(SlotNo::Two).rf_state(), RfState::Data);

    router.tick(start + Duration::from_secs(30));
    let host = router.get_handler(Protocol::Dmr).unwrap().as_any_mut().downcast_mut::<DmrHost>().unwrap();
    assert!(host.control().slot(SlotNo::Two).is_idle());
}
