//! wdctl - watchdog control CLI
//!
//! Reads and writes the nodes of a watchdog control surface, sysctl style,
//! and runs the software watchdog against a live heartbeat.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod backend;
mod config;
mod error;
mod ops;
mod output;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wdog::{ControlSurface, WatchdogController, WatchdogError};

use crate::backend::BackendKind;
use crate::config::WdctlConfig;
use crate::error::CliError;
use crate::ops::Op;
use crate::output::Report;
use crate::run::RunArgs;

#[derive(Parser, Debug)]
#[command(name = "wdctl")]
#[command(about = "Watchdog control CLI - read and write watchdog nodes")]
#[command(version)]
#[command(subcommand_precedence_over_arg = true)]
#[command(long_about = "
wdctl applies node operations to one watchdog controller, in order.
Each operation is either a node name (read) or name=value (write), e.g.

    wdctl --backend sc1100 config.timeout=5 config.action=reset enable=1 state

Node names may be given with or without the dev.watchdog.<unit>. prefix.
Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "WDCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Backend to attach
    #[arg(short, long, global = true, value_enum)]
    backend: Option<BackendKind>,

    /// Unit number used in node names
    #[arg(short, long, global = true)]
    unit: Option<u32>,

    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Read every readable node
    #[arg(short, long)]
    all: bool,

    /// Describe every node instead of reading it
    #[arg(short, long, conflicts_with = "all")]
    describe: bool,

    /// Node operations: NAME to read, NAME=VALUE to write
    #[arg(value_name = "OP")]
    ops: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the software watchdog against a live heartbeat
    Run(RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!(
                        "wdctl={log_level},wdog={log_level},wdog_sw={log_level},wdog_sim={log_level}"
                    )
                    .into()
                }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(error::exit_code(&e))
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => WdctlConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => WdctlConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    let backend = cli.backend.or(config.backend).unwrap_or(BackendKind::Sw);
    let unit = cli.unit.unwrap_or(config.unit);

    match &cli.command {
        Some(Commands::Run(args)) => {
            if !cli.ops.is_empty() || cli.all || cli.describe {
                return Err(WatchdogError::invalid(
                    "node operations for `run` go after the subcommand",
                )
                .into());
            }
            if backend != BackendKind::Sw {
                return Err(CliError::WrongBackend(backend.as_str()).into());
            }
            run::execute(args, &config, unit, cli.json)
        }
        None => execute_ops(cli, &config, backend, unit),
    }
}

fn execute_ops(cli: &Cli, config: &WdctlConfig, backend: BackendKind, unit: u32) -> Result<()> {
    let ops = cli
        .ops
        .iter()
        .map(|op| op.parse::<Op>())
        .collect::<Result<Vec<_>, _>>()?;

    let controller = WatchdogController::attach(backend.build(config.software)?);
    tracing::info!(backend = controller.name(), unit, "Attached watchdog");
    let surface = ControlSurface::new(Arc::new(controller), unit);

    if cli.describe {
        let nodes: Vec<_> = surface.list().collect();
        output::print_nodes(&nodes, cli.json);
        return Ok(());
    }

    let mut report = Report::new(cli.json);
    for op in &ops {
        report.push(op.apply(&surface)?);
    }
    if cli.all || ops.is_empty() {
        for (node, value) in surface.snapshot()? {
            report.push(ops::Outcome {
                node,
                old: None,
                value,
            });
        }
    }
    report.finish(None);
    Ok(())
}
