//! governor-controllerd - controller daemon.
//!
//! Periodically reads per-cgroup counters, compares against configured
//! soft/hard limits, consults the policy for a suggested new soft limit,
//! writes updated limits back to the cgroup hierarchy, and emits soft/hard
//! limit-hit events and policy-effectiveness events.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use governor_core::cgroupfs::RealFs;
use governor_core::controller::Controller;
use governor_core::journal::{self, Journal};
use governor_core::model::ContainerSpec;
use governor_core::policy::{HeuristicPolicy, ModelPolicy, Policy};
use governor_core::Config;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Controller daemon: enforces soft/hard cgroup limits.
#[derive(Parser)]
#[command(name = "governor-controllerd", about = "Adaptive resource governor controller", version)]
struct Args {
    /// Path to the containers configuration file.
    #[arg(long, default_value = "config/containers.yml")]
    config: String,

    /// Print events, would-be samples, and would-be cgroup writes to
    /// standard output instead of touching cgroupfs or the journals.
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("governor_controllerd={level}").parse().unwrap())
        .add_directive(format!("governor_core={level}").parse().unwrap());

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Loads the configured `ModelPolicy`, falling back to `HeuristicPolicy`
/// with a logged notice if the model file is absent or malformed.
fn load_policy(model_path: Option<&String>) -> Box<dyn Policy> {
    match model_path {
        Some(path) => match ModelPolicy::load(std::path::Path::new(path)) {
            Ok(policy) => {
                info!("policy: loaded model from {path}");
                Box::new(policy)
            }
            Err(e) => {
                warn!("policy: failed to load model {path} ({e}), falling back to heuristic");
                Box::new(HeuristicPolicy)
            }
        },
        None => {
            info!("policy: no model configured, using heuristic");
            Box::new(HeuristicPolicy)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("governor-controllerd {} starting", env!("CARGO_PKG_VERSION"));

    let config = match Config::load(std::path::Path::new(&args.config)) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load config {}: {e}", args.config);
            std::process::exit(1);
        }
    };

    let containers: BTreeMap<String, ContainerSpec> = config.containers.clone();
    info!("managing {} container(s)", containers.len());

    let dry_run = args.dry_run;
    let mut events = match Journal::open(std::path::Path::new(&config.events.sink), dry_run) {
        Ok(j) => j,
        Err(e) => {
            error!("failed to open event journal {}: {e}", config.events.sink);
            std::process::exit(1);
        }
    };
    let mut samples = match journal::open_optional(config.metrics.samples_sink.as_ref(), dry_run) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to open samples journal: {e}");
            std::process::exit(1);
        }
    };

    let policy = load_policy(config.ml.model_path.as_ref());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        error!("failed to set Ctrl-C handler: {e}");
    }

    let fs = RealFs::new();
    let mut controller = match Controller::new(fs, policy, containers, dry_run) {
        Ok(c) => c,
        Err(e) => {
            error!("invalid container configuration: {e}");
            std::process::exit(1);
        }
    };

    info!("starting controller loop, interval={:?}", config.sample_interval());
    controller.run(&mut events, samples.as_mut(), config.sample_interval(), &running);

    info!("controller loop stopped, exiting");
}
