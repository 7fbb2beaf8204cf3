mod logging;
mod trace;

use std::{
    collections::VecDeque,
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use parking_lot::Mutex;
use wifi_station::{
    ConnectionController, EventDispatcher, Outcome, StackError, StationConfig, StationStack,
    DEFAULT_MAX_RETRIES,
};

use logging::Logger;
use trace::{load_trace, Expectation, TraceStep};

#[derive(Debug, Parser)]
#[command(name = "station_replay")]
#[command(about = "Replay a station notification trace against the connection controller")]
struct Cli {
    /// Trace file: one of start|startable|lost [reason]|got_ip <addr>|reject per line.
    trace: PathBuf,
    /// Station config (TOML: ssid, password, max_retries).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides max_retries from the config.
    #[arg(long = "max-retries")]
    max_retries: Option<u32>,
    /// connected[:addr] | failed | timeout
    #[arg(long)]
    expect: Option<String>,
    #[arg(long = "log-json")]
    log_json: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

/// Stack double whose connect calls succeed unless a `reject` step queued a failure.
#[derive(Default)]
struct ReplayStack {
    calls: AtomicU32,
    rejections: Mutex<VecDeque<StackError>>,
}

impl StationStack for ReplayStack {
    fn begin_attempt(&self) -> Result<(), StackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.rejections.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Logger::new(level, cli.log_json.clone())?.install()?;

    let expectation = cli.expect.as_deref().map(Expectation::parse).transpose()?;
    let config = load_config(&cli)?;
    let steps = load_trace(&cli.trace)?;

    let stack = Arc::new(ReplayStack::default());
    let dispatcher = EventDispatcher::new();
    let controller = Arc::new(ConnectionController::new(config, stack.clone()));
    dispatcher.register(controller.clone());

    println!("step,line,event,phase,retry,attempts");
    for line in &steps {
        let label = match line.step {
            TraceStep::Start => {
                if let Err(err) = controller.start() {
                    println!("error,{},{}", line.line_no, err);
                }
                "start"
            }
            TraceStep::Notify(notification) => {
                dispatcher.deliver(notification);
                notification.kind().as_str()
            }
            TraceStep::Reject => {
                stack.rejections.lock().push_back(StackError::Driver { code: -1 });
                "reject"
            }
        };
        let snapshot = controller.snapshot();
        println!(
            "step,{},{},{},{},{}",
            line.line_no,
            label,
            snapshot.phase.as_str(),
            snapshot.retry_count,
            snapshot.attempts
        );
    }
    dispatcher.unregister();

    let outcome = controller.await_outcome(Duration::ZERO).ok();
    match outcome {
        Some(Outcome::Connected(address)) => println!("outcome,connected,{address}"),
        Some(Outcome::Failed) => println!("outcome,failed"),
        None => println!("outcome,timeout"),
    }
    println!(
        "stack,begin_attempt_calls,{}",
        stack.calls.load(Ordering::SeqCst)
    );

    if let Some(expectation) = expectation {
        if !expectation.matches(outcome) {
            bail!("outcome mismatch: expected {expectation:?}, got {outcome:?}");
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<StationConfig> {
    let config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            StationConfig::from_toml_str(&raw)
                .with_context(|| format!("invalid station config {}", path.display()))?
        }
        None => match StationConfig::compiled() {
            Some(config) => config?,
            None => StationConfig::new("replay", "", DEFAULT_MAX_RETRIES)?,
        },
    };
    Ok(match cli.max_retries {
        Some(max_retries) => config.with_max_retries(max_retries),
        None => config,
    })
}
