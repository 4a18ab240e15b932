//! One-shot submission: the manual-entry / camera-decode path.

use anyhow::Result;
use floortrack_engine::{InputEvent, InputSource, ManualFieldSource, SubmitOutcome};
use floortrack_protocol::SubmitMode;

use super::config::Config;
use super::context::build_processor;

#[derive(Debug, clap::Args)]
pub struct SubmitArgs {
    /// Raw identifier (machine id, partial id, or name fragment)
    pub raw: String,

    /// Force auto-run for this submission
    #[arg(long, conflicts_with = "interactive")]
    pub auto_run: bool,

    /// Force the confirmation flow for this submission
    #[arg(long)]
    pub interactive: bool,
}

pub fn run(args: SubmitArgs) -> Result<()> {
    let config = Config::load()?;
    let mode = if args.auto_run {
        SubmitMode::AutoRun
    } else if args.interactive {
        SubmitMode::Interactive
    } else if config.auto_run {
        SubmitMode::AutoRun
    } else {
        SubmitMode::Interactive
    };

    let mut field = ManualFieldSource;
    let Some(raw) = field.push(InputEvent::Text(args.raw.clone())) else {
        println!("Nothing to submit.");
        return Ok(());
    };

    let mut processor = build_processor(&config)?;
    match processor.submit(&raw, mode)? {
        SubmitOutcome::Applied(applied) => {
            println!("{}: {} -> {}", applied.machine_id, applied.action, applied.new_value);
            if !applied.audit_logged {
                eprintln!("Warning: state updated but the audit append failed.");
            }
        }
        SubmitOutcome::AwaitingConfirmation { machine_id, diverted } => {
            if let Some(health) = diverted {
                println!(
                    "Auto-run bypassed: {machine_id} is in {health} state. \
                     Update its health first."
                );
            } else {
                println!("{machine_id} resolved; confirmation required.");
            }
            println!("Run `floortrack scan` for the interactive confirmation flow.");
            // one-shot invocation cannot confirm; discard without mutation
            processor.ignore();
        }
        SubmitOutcome::Dropped => {
            println!("Submission dropped: another scan is still being processed.");
        }
    }
    Ok(())
}
