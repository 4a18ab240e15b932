//! Floortrack terminal.
//!
//! One binary for the floor: the scan terminal itself plus registry,
//! catalog, audit, and shift maintenance commands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use floortrack_logging::LogConfig;
use std::process::ExitCode;
use tracing::error;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "floortrack", about = "Factory machine state tracking terminal")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the interactive scan terminal (keyboard-wedge scanners)
    Scan(cli::scan::ScanArgs),
    /// Submit one identifier and exit (manual entry / camera decode)
    Submit(cli::submit::SubmitArgs),
    /// Manage the machine registry
    Machine {
        #[command(subcommand)]
        action: cli::machine::MachineAction,
    },
    /// Manage floor sections
    Section {
        #[command(subcommand)]
        action: cli::catalog::SectionAction,
    },
    /// Manage machine types
    #[command(name = "type")]
    MachineType {
        #[command(subcommand)]
        action: cli::catalog::TypeAction,
    },
    /// Show recent audit records
    Audit(cli::audit::AuditArgs),
    /// Start-of-day reset: clear scan history, return the floor to IDLE
    StartDay(cli::start_day::StartDayArgs),
    /// Show or change configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let terminal_mode = matches!(args.command, Commands::Scan(_));
    if let Err(err) = floortrack_logging::init_logging(LogConfig {
        app_name: "floortrack",
        verbose: args.verbose,
        terminal_mode,
    }) {
        eprintln!("Failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    let result: Result<()> = match args.command {
        Commands::Scan(args) => cli::scan::run(args),
        Commands::Submit(args) => cli::submit::run(args),
        Commands::Machine { action } => cli::machine::run(action),
        Commands::Section { action } => cli::catalog::run_section(action),
        Commands::MachineType { action } => cli::catalog::run_type(action),
        Commands::Audit(args) => cli::audit::run(args),
        Commands::StartDay(args) => cli::start_day::run(args),
        Commands::Config(args) => cli::config::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
