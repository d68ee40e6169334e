//! # VFD Control Unit
//!
//! Polls one drive over Modbus TCP (or a simulated drive with
//! `--simulate`), runs the control state machine every poll interval and
//! accepts operator commands on stdin:
//!
//! ```text
//! start | stop | reset | estop | release | speed <hz>
//! ```
//!
//! Ctrl-C closes the drive session and exits.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use vfd_common::config::DriveAppConfig;
use vfd_common::drive::transport::RegisterTransport;
use vfd_control_unit::command::OperatorCommand;
use vfd_control_unit::publish::LogSink;
use vfd_control_unit::{DriveApplication, LogAnnunciator};
use vfd_hal::{ModbusTcpTransport, SimulatedDrive};

type App<T> = DriveApplication<T, LogAnnunciator, LogSink>;

/// VFD Control Unit: drive monitoring and control
#[derive(Parser, Debug)]
#[command(name = "vfd_control_unit")]
#[command(version)]
#[command(about = "Monitor and control a variable-frequency drive over Modbus TCP")]
struct Args {
    /// Path to the drive configuration TOML.
    #[arg(short, long, default_value = "config/vfd.toml")]
    config: PathBuf,

    /// Run against an in-memory simulated drive instead of the network.
    #[arg(long)]
    simulate: bool,

    /// Stop after this many poll cycles.
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match DriveAppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, Level::INFO);
            error!("FATAL: cannot load {}: {e}", args.config.display());
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level.into());

    info!("VFD Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("VFD Control Unit shutdown complete");
}

fn run(args: &Args, config: DriveAppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        if args.simulate {
            warn!("Running against a simulated drive");
            let app = App::new(config, SimulatedDrive::new(), LogAnnunciator::new(), LogSink);
            poll_loop(app, args.cycles).await
        } else {
            let transport = ModbusTcpTransport::new(&config.connection);
            let app = App::new(config, transport, LogAnnunciator::new(), LogSink);
            poll_loop(app, args.cycles).await
        }
    })
}

async fn poll_loop<T: RegisterTransport>(
    mut app: App<T>,
    cycles: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let period = app.config().monitoring.poll_interval();
    info!("Polling every {:?}", period);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut completed: u64 = 0;
    let result = loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break Ok(());
            }
            _ = interval.tick() => {
                if let Err(e) = app.run_cycle().await {
                    break Err(e.into());
                }
                completed += 1;
                if cycles.is_some_and(|n| completed >= n) {
                    info!("Completed {} cycles", completed);
                    break Ok(());
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_line(&mut app, &line).await,
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin closed: {e}");
                    stdin_open = false;
                }
            },
        }
    };

    app.shutdown().await;
    result
}

async fn handle_line<T: RegisterTransport>(app: &mut App<T>, line: &str) {
    let command = match OperatorCommand::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return,
        Err(e) => {
            warn!("{e}");
            return;
        }
    };

    match command {
        OperatorCommand::Start => match app.start() {
            Ok(true) => {}
            Ok(false) => warn!("Start ignored in state {}", app.state()),
            Err(e) => warn!("Start rejected: {e}"),
        },
        OperatorCommand::Stop => {
            if !app.stop() {
                warn!("Stop ignored in state {}", app.state());
            }
        }
        OperatorCommand::FaultReset => {
            let outcome = app.fault_reset().await;
            info!("Fault reset: {:?}", outcome);
        }
        OperatorCommand::EmergencyStop => app.emergency_stop(),
        OperatorCommand::ReleaseEmergency => match app.reset_emergency().await {
            Ok(true) => info!("Emergency stop released"),
            Ok(false) => warn!("Not in emergency stop"),
            Err(e) => error!("{e}"),
        },
        OperatorCommand::Speed(value) => match app.set_speed_setpoint_text(&value).await {
            Ok(hz) => info!("Speed reference {:.2} Hz", hz),
            Err(e) => warn!("Setpoint rejected: {e}"),
        },
    }
}

fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
