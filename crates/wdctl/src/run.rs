//! `wdctl run`: drive the software watchdog from a live heartbeat.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::json;
use wdog::{ControlSurface, WatchdogController, WatchdogError, parse_seconds};
use wdog_sw::{
    FireHandler, HeartbeatRegistry, PanicFireHandler, RecordingFireHandler, SoftwareWatchdog,
    Ticker,
};

use crate::config::WdctlConfig;
use crate::error::CliError;
use crate::ops::Op;
use crate::output::{self, Report};

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// How long to run, in seconds
    #[arg(long, value_parser = parse_seconds)]
    pub duration: Option<Duration>,

    /// Time between rearms, in seconds
    #[arg(long, value_parser = parse_seconds)]
    pub rearm_interval: Option<Duration>,

    /// Heartbeat rate in ticks per second
    #[arg(long)]
    pub hz: Option<u32>,

    /// Offer the debugger action
    #[arg(long)]
    pub debugger: bool,

    /// Never rearm, letting the watchdog expire
    #[arg(long)]
    pub no_rearm: bool,

    /// Record fatal expiries instead of aborting
    #[arg(long)]
    pub no_panic: bool,

    /// Node operations applied before the heartbeat starts
    #[arg(value_name = "OP")]
    pub ops: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    backend: String,
    hz: u32,
    elapsed_ms: u128,
    ticks: u64,
    rearms: u64,
    fires: u64,
    debugger_entries: u64,
    fatal_expiries: u64,
    state: String,
}

pub fn execute(args: &RunArgs, config: &WdctlConfig, unit: u32, json: bool) -> Result<()> {
    let mut software = config.software;
    if let Some(hz) = args.hz {
        software.hz = hz;
    }
    software.debugger |= args.debugger;
    software.validate().context("software watchdog configuration")?;

    let duration = args.duration.unwrap_or_else(|| config.run.duration());
    let rearm_interval = args
        .rearm_interval
        .unwrap_or_else(|| config.run.rearm_interval());
    if rearm_interval.is_zero() {
        return Err(WatchdogError::invalid("rearm interval must be positive").into());
    }

    let recorder = Arc::new(RecordingFireHandler::new());
    let handler: Arc<dyn FireHandler> = if args.no_panic {
        Arc::clone(&recorder) as Arc<dyn FireHandler>
    } else {
        Arc::new(PanicFireHandler)
    };
    let watchdog = SoftwareWatchdog::with_handler(software, handler)?;
    let registry = Arc::new(HeartbeatRegistry::new());
    registry.register(&watchdog)?;

    let controller = Arc::new(WatchdogController::attach(watchdog));
    let surface = ControlSurface::new(Arc::clone(&controller), unit);
    let mut report = Report::new(json);
    for op in &args.ops {
        let op: Op = op.parse()?;
        report.push(op.apply(&surface)?);
    }
    if !controller.query_state().running {
        tracing::warn!("Watchdog is not enabled, heartbeats will be ignored");
    }

    let ticker = Ticker::spawn(Arc::clone(&registry), software.hz)?;
    tracing::info!(?duration, ?rearm_interval, hz = software.hz, "Heartbeat running");

    let started = Instant::now();
    let mut rearms: u64 = 0;
    while let Some(left) = duration.checked_sub(started.elapsed()) {
        if left.is_zero() {
            break;
        }
        thread::sleep(rearm_interval.min(left));
        if args.no_rearm || !controller.query_state().running {
            continue;
        }
        controller.rearm()?;
        rearms = rearms.saturating_add(1);
    }
    let ticks = ticker.ticks_sent();
    ticker.stop();
    registry.unregister();

    let summary = RunSummary {
        backend: controller.name().to_owned(),
        hz: software.hz,
        elapsed_ms: started.elapsed().as_millis(),
        ticks,
        rearms,
        fires: controller.with_backend(SoftwareWatchdog::fire_count),
        debugger_entries: recorder.debugger_count(),
        fatal_expiries: recorder.fatal_count(),
        state: controller.query_state().to_string(),
    };
    tracing::debug!(?summary, "Run finished");

    if json {
        report.finish(Some(json!({ "run": summary })));
    } else {
        output::print_summary(&[
            ("backend", summary.backend.clone()),
            ("ticks", summary.ticks.to_string()),
            ("rearms", summary.rearms.to_string()),
            ("expiries", summary.fires.to_string()),
            ("debugger entries", summary.debugger_entries.to_string()),
            ("fatal expiries", summary.fatal_expiries.to_string()),
            ("state", summary.state.clone()),
        ]);
    }

    if summary.fatal_expiries > 0 {
        return Err(CliError::Expired(format!(
            "{} fatal expiries recorded",
            summary.fatal_expiries
        ))
        .into());
    }
    Ok(())
}
