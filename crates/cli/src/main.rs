//! padctl - OpenPad gamepad diagnostics
//!
//! Lists the evdev gamepads the driver discovers and watches their live
//! state, using the same probing and hotplug path applications use.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::DriverOptions;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "padctl")]
#[command(about = "OpenPad gamepad diagnostics - list controllers and watch their state")]
#[command(version)]
#[command(long_about = "
padctl drives the OpenPad evdev gamepad driver from the command line.
It scans the input device directory, reports every node that looks like a
game controller and can follow hotplug and input changes live.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input device directory
    #[arg(long, global = true, env = "PADCTL_DEVICE_DIR")]
    device_dir: Option<PathBuf>,

    /// Driver configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not arm the hotplug watch
    #[arg(long, global = true)]
    no_hotplug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected gamepads
    List {
        /// Include current axis, button and hat state
        #[arg(short, long)]
        detailed: bool,
    },

    /// Watch hotplug and state changes
    Watch {
        /// Update interval in milliseconds
        #[arg(long, default_value_t = 16)]
        interval_ms: u64,

        /// Stop after this many updates
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            config_file: self.config.clone(),
            device_dir: self.device_dir.clone(),
            no_hotplug: self.no_hotplug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("padctl={log_level},openpad_gamepad={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    let options = cli.driver_options();
    match &cli.command {
        Commands::List { detailed } => commands::list::execute(&options, cli.json, *detailed),
        Commands::Watch { interval_ms, ticks } => {
            commands::watch::execute(&options, cli.json, *interval_ms, *ticks).await
        }
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}
