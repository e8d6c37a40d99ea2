use clap::Parser;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, bounded, never, select, tick, unbounded};

use ghost_config::{RuleStore, SharedConfig, TomlRuleStore, toml_config};
use ghost_core::{Protocol, debug};
use ghost_entities::FrameRouter;
use ghost_entities::ax25::Ax25Handler;
use ghost_entities::dmr::access_control::RuleSet;
use ghost_entities::dmr::lookup::{FileIdLookup, NoLookup};
use ghost_entities::dmr::{AccessControl, DmrHost, IdLookup};
use ghost_entities::dstar::DStarHandler;
use ghost_entities::m17::M17Handler;
use ghost_entities::nxdn::NxdnHandler;
use ghost_entities::pocsag::PocsagHandler;
use ghost_entities::ysf::YsfHandler;

mod capture;

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(100);

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Builds the access-control engine from the configured rule file, if any
fn build_access_control(cfg: &SharedConfig) -> (Arc<AccessControl>, Option<TomlRuleStore>) {
    let c = cfg.config();
    let self_only = c.dmr.self_only;
    let local_id = c.general.dmr_id;

    let Some(rules_file) = c.access_control.rules_file.as_ref() else {
        tracing::info!("no rules file configured, admitting by prefix only");
        return (Arc::new(AccessControl::new(self_only, local_id, RuleSet::default())), None);
    };

    let store = TomlRuleStore::new(rules_file);
    match AccessControl::from_store(self_only, local_id, &store) {
        Ok(access) => (Arc::new(access), Some(store)),
        Err(e) => {
            tracing::error!("failed to load access rules from {}: {}", rules_file, e);
            std::process::exit(1);
        }
    }
}

fn build_lookup(cfg: &SharedConfig) -> Box<dyn IdLookup> {
    match cfg.config().access_control.id_lookup_file.as_ref() {
        Some(path) => match FileIdLookup::from_file(path) {
            Ok(lookup) => Box::new(lookup),
            Err(e) => {
                tracing::warn!("id lookup {} unavailable, logging plain ids: {}", path, e);
                Box::new(NoLookup)
            }
        },
        None => Box::new(NoLookup),
    }
}

/// Registers a handler for every enabled protocol
fn build_host(cfg: &SharedConfig, access: Arc<AccessControl>) -> FrameRouter {
    let mut router = FrameRouter::new(cfg.clone());
    let c = cfg.config();

    if c.dmr.enable {
        router.register_handler(Box::new(DmrHost::new(cfg.clone(), access, build_lookup(cfg))));
    }
    if c.dstar.enable {
        router.register_handler(Box::new(DStarHandler::new(&c.dstar)));
    }
    if c.m17.enable {
        router.register_handler(Box::new(M17Handler::new(&c.m17)));
    }
    if c.ax25.enable {
        router.register_handler(Box::new(Ax25Handler::new(&c.ax25)));
    }
    if c.nxdn.enable {
        router.register_handler(Box::new(NxdnHandler::new(&c.nxdn)));
    }
    if c.pocsag.enable {
        router.register_handler(Box::new(PocsagHandler::new(&c.pocsag)));
    }
    if c.ysf.enable {
        router.register_handler(Box::new(YsfHandler::new(&c.ysf)));
    }
    router
}

/// Starts a thread replaying `path`. The returned channel disconnects at the end of the capture.
fn spawn_replay(path: String) -> Receiver<(Protocol, Vec<u8>)> {
    let (tx, rx) = unbounded();
    thread::spawn(move || match capture::replay(&path, &tx) {
        Ok(n) => tracing::info!("replayed {} frames from {}", n, path),
        Err(e) => tracing::error!("failed to read capture {}: {}", path, e),
    });
    rx
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "MMDVM ghost host",
    long_about = "Runs the multi-mode digital voice host using the provided TOML configuration file"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with station, protocol and access control parameters")]
    config: String,

    /// Frame capture to replay instead of waiting for a modem
    #[arg(short, long)]
    input: Option<String>,

    /// Log everything to stdout
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = if args.verbose {
        debug::setup_logging_verbose();
        None
    } else {
        match debug::setup_logging_default(cfg.config().debug_log.clone()) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Failed to open log file: {}", e);
                std::process::exit(1);
            }
        }
    };
    tracing::info!("starting as {} ({})", cfg.config().general.callsign, cfg.config().general.dmr_id);

    let (access, store) = build_access_control(&cfg);
    let mut router = build_host(&cfg, Arc::clone(&access));

    // Set up Ctrl+C handler for graceful shutdown
    let (stop_tx, stop_rx) = bounded(1);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    }) {
        tracing::error!("failed to set Ctrl+C handler: {}", e);
        std::process::exit(1);
    }

    let frames = match args.input {
        Some(path) => spawn_replay(path),
        None => never(),
    };
    let housekeeping = tick(HOUSEKEEPING_INTERVAL);
    let reload_secs = cfg.config().access_control.reload_secs;
    let reload = match (&store, reload_secs) {
        (Some(_), secs) if secs > 0 => tick(Duration::from_secs(secs)),
        _ => never(),
    };

    loop {
        select! {
            recv(frames) -> msg => match msg {
                Ok((protocol, frame)) => {
                    router.dispatch(protocol, &frame);
                }
                Err(_) => {
                    tracing::info!("end of capture");
                    break;
                }
            },
            recv(housekeeping) -> _ => router.tick(Instant::now()),
            recv(reload) -> _ => {
                if let Some(store) = store.as_ref() {
                    let _ = access.reload_rules(store as &dyn RuleStore);
                }
            },
            recv(stop_rx) -> _ => {
                tracing::info!("shutting down");
                break;
            },
        }
    }

    if router.unrouted() > 0 {
        tracing::info!("{} frames had no handler", router.unrouted());
    }
}
