//! governor-agentd - observer daemon.
//!
//! Periodically samples system-wide pressure-stall information and
//! per-cgroup statistics, and publishes an event and sample stream that the
//! controller and offline tooling both consume.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use governor_core::cgroupfs::RealFs;
use governor_core::journal::{self, Journal};
use governor_core::model::ContainerSpec;
use governor_core::observer::Observer;
use governor_core::Config;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Observer daemon: publishes pressure and cgroup anomaly events.
#[derive(Parser)]
#[command(name = "governor-agentd", about = "Adaptive resource governor observer", version)]
struct Args {
    /// Path to the containers configuration file.
    #[arg(long, default_value = "config/containers.yml")]
    config: String,

    /// Print events and would-be samples to standard output instead of
    /// writing to the configured journals.
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
        .add_directive(format!("governor_agentd={level}").parse().unwrap())
        .add_directive(format!("governor_core={level}").parse().unwrap());

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!("governor-agentd {} starting", env!("CARGO_PKG_VERSION"));

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

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        error!("failed to set Ctrl-C handler: {e}");
    }

    let fs = RealFs::new();
    let mut observer = Observer::new(fs, containers, dry_run);

    info!("starting observer loop, interval={:?}", config.sample_interval());
    observer.run(&mut events, samples.as_mut(), config.sample_interval(), &running);

    info!("observer loop stopped, exiting");
}
