//! e2sim E2 node simulator
//!
//! Connects to a RIC, runs the E2 setup handshake and serves E2SM-RC until
//! SIGINT, SIGTERM or SIGTRAP arrives.
//!
//! # Usage
//!
//! ```bash
//! e2sim -c config/e2sim.yaml
//! e2sim -c config/e2sim.yaml --ric-addr 10.0.2.10 --ric-port 36422
//! e2sim -c config/e2sim.yaml --listen-port 36421
//! ```
//!
//! With `--listen-port` the node waits for the RIC to connect instead of
//! dialing out. Failing to listen or accept ends the process.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use e2sim_common::{init_logging, E2NodeConfig, LogLevel};
use e2sim_node::{load_and_validate_e2node_config, validate_e2node_config, E2NodeApp, SignalTermination, TerminationHook};

/// e2sim - E2 Node Simulator
#[derive(Parser, Debug)]
#[command(name = "e2sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the node configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: Option<String>,

    /// RIC E2 termination address, overrides the configuration
    #[arg(long = "ric-addr", value_name = "ADDR")]
    ric_addr: Option<String>,

    /// RIC E2 termination SCTP port, overrides the configuration
    #[arg(long = "ric-port", value_name = "PORT")]
    ric_port: Option<u16>,

    /// Wait for the RIC on this local SCTP port instead of connecting out
    #[arg(long = "listen-port", value_name = "PORT")]
    listen_port: Option<u32>,

    /// Local address to listen on with --listen-port
    #[arg(long = "listen-addr", value_name = "ADDR", default_value = "0.0.0.0")]
    listen_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

/// Remembers that a fatal condition stopped the node, then signals the process.
#[derive(Default)]
struct FatalTermination {
    fired: AtomicBool,
}

impl TerminationHook for FatalTermination {
    fn terminate(&self, reason: &str) {
        self.fired.store(true, Ordering::SeqCst);
        SignalTermination.terminate(reason);
    }
}

fn load_config(args: &Args) -> Result<E2NodeConfig> {
    let mut config = match &args.config_file {
        Some(path) => load_and_validate_e2node_config(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => E2NodeConfig::default(),
    };
    if let Some(addr) = &args.ric_addr {
        config.ric.address = addr.clone();
    }
    if let Some(port) = args.ric_port {
        config.ric.port = port;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    validate_e2node_config(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Waits for the first shutdown signal.
async fn wait_for_signal() -> Result<&'static str> {
    let mut interrupt = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut trap = signal(SignalKind::from_raw(libc::SIGTRAP)).context("Failed to install SIGTRAP handler")?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = trap.recv() => "SIGTRAP",
    };
    Ok(name)
}

async fn run(args: Args) -> Result<bool> {
    let config = load_config(&args)?;
    init_logging(config.log_level);

    info!("e2sim v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Node PLMN {}-{} gNB {} cell {}, RIC at {}:{}",
        config.mcc, config.mnc, config.gnb_id, config.cell_id, config.ric.address, config.ric.port
    );

    let hook = Arc::new(FatalTermination::default());
    let app = E2NodeApp::with_termination_hook(config, Arc::clone(&hook) as Arc<dyn TerminationHook>)
        .context("Failed to build the E2 node")?;

    let app = Arc::new(app);

    // Install the handlers first so a fatal connect is observed as SIGTERM.
    let mut shutdown = tokio::spawn(wait_for_signal());
    tokio::task::yield_now().await;

    match args.listen_port {
        Some(port) => {
            // accept() blocks; the thread is left behind if a signal wins
            let (accepted_tx, accepted_rx) = tokio::sync::oneshot::channel();
            let acceptor = Arc::clone(&app);
            let bind_addr = args.listen_addr.clone();
            thread::Builder::new()
                .name("e2-accept".to_string())
                .spawn(move || {
                    let _ = accepted_tx.send(acceptor.accept_from_ric(&bind_addr, port));
                })
                .context("Failed to spawn the accept thread")?;

            tokio::select! {
                accepted = accepted_rx => {
                    accepted
                        .context("Accept thread exited")?
                        .context("Failed to accept the RIC")?;
                }
                signal = &mut shutdown => {
                    let signal = signal.context("Signal task failed")??;
                    info!("Received {} while waiting for the RIC", signal);
                    app.shutdown();
                    return Ok(true);
                }
            }
        }
        None => {
            if let Err(e) = app.connect_to_ric() {
                error!("{}", e);
            }
        }
    }

    let signal = shutdown.await.context("Signal task failed")??;
    info!("Received {}, shutting down", signal);
    app.shutdown();

    Ok(!hook.fired.load(Ordering::SeqCst))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
