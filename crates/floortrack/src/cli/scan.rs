//! Interactive scan terminal.
//!
//! Keyboard-wedge scanners show up as plain keyboards, so the terminal runs
//! in raw mode and feeds every keystroke to the raw-device source; Enter is
//! the scan terminator. While a confirmation prompt is open the device
//! stream is suppressed and keys drive the prompt instead.

use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::event::{read, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use floortrack_engine::{
    EngineError, InputEvent, InputSource, RawDeviceSource, ScanProcessor, SubmitOutcome,
};
use floortrack_protocol::{ActivityStatus, HealthStatus, SubmitMode};
use tracing::info;

use super::config::Config;
use super::context::build_processor;

#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// Force auto-run for this session
    #[arg(long, conflicts_with = "interactive")]
    pub auto_run: bool,

    /// Force the confirmation flow for this session
    #[arg(long)]
    pub interactive: bool,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enter raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Raw mode needs an explicit carriage return.
fn say(line: &str) {
    print!("{line}\r\n");
    let _ = io::stdout().flush();
}

pub fn run(args: ScanArgs) -> Result<()> {
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

    let mut processor = build_processor(&config)?;
    // one listener for the whole session
    let mut device = RawDeviceSource::new(config.min_scan_len);

    let _guard = RawModeGuard::enter()?;
    say(&format!(
        "Scan terminal ready ({} mode). Scan a tag or type an id and press Enter. Ctrl+C quits.",
        mode
    ));
    info!(mode = %mode, "scan terminal started");

    loop {
        let Event::Key(key) = read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
        {
            say("Bye.");
            break;
        }

        if processor.pending().is_some() {
            handle_prompt_key(&mut processor, &mut device, key.code);
            continue;
        }

        match key.code {
            KeyCode::Char(ch) => {
                device.push(InputEvent::Key(ch));
                print!("{ch}");
                let _ = io::stdout().flush();
            }
            KeyCode::Enter => {
                say("");
                if let Some(raw) = device.push(InputEvent::Terminator) {
                    handle_submission(&mut processor, &mut device, &raw, mode);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn handle_submission(
    processor: &mut ScanProcessor,
    device: &mut RawDeviceSource,
    raw: &str,
    mode: SubmitMode,
) {
    match processor.submit(raw, mode) {
        Ok(SubmitOutcome::Applied(applied)) => {
            say(&format!(
                "{}: {} -> {}",
                applied.machine_id, applied.action, applied.new_value
            ));
            if !applied.audit_logged {
                say("Warning: state updated but the audit append failed.");
            }
        }
        Ok(SubmitOutcome::AwaitingConfirmation { machine_id, diverted }) => {
            // prompt owns the keyboard until the operator decides
            device.set_suppressed(true);
            if let Some(health) = diverted {
                say(&format!(
                    "Auto-run bypassed: {machine_id} is in {health} state."
                ));
            } else {
                say(&format!("{machine_id} resolved."));
            }
            show_prompt();
        }
        Ok(SubmitOutcome::Dropped) => {
            say("(dropped: still processing the previous scan)");
        }
        Err(err) => say(&format!("Error: {err}")),
    }
}

fn show_prompt() {
    say("  [r] RUNNING  [i] IDLE  |  health: [w] WORKING  [h] HALF_WORKING  [b] BREAKDOWN  [x] REMOVED  |  [Esc] ignore");
}

fn handle_prompt_key(
    processor: &mut ScanProcessor,
    device: &mut RawDeviceSource,
    code: KeyCode,
) {
    let result = match code {
        KeyCode::Char('r') => processor.confirm_activity(ActivityStatus::Running),
        KeyCode::Char('i') => processor.confirm_activity(ActivityStatus::Idle),
        KeyCode::Char('w') => processor.confirm_health(HealthStatus::Working),
        KeyCode::Char('h') => processor.confirm_health(HealthStatus::HalfWorking),
        KeyCode::Char('b') => processor.confirm_health(HealthStatus::Breakdown),
        KeyCode::Char('x') => processor.confirm_health(HealthStatus::Removed),
        KeyCode::Esc => {
            processor.ignore();
            device.set_suppressed(false);
            say("Scan ignored.");
            return;
        }
        _ => return,
    };

    match result {
        Ok(applied) => {
            device.set_suppressed(false);
            say(&format!(
                "{}: {} -> {}",
                applied.machine_id, applied.action, applied.new_value
            ));
            if !applied.audit_logged {
                say("Warning: state updated but the audit append failed.");
            }
        }
        Err(err @ EngineError::HealthBlocked(_)) => {
            // stay in the prompt: fix health or ignore
            say(&format!("{err}. Mark it WORKING first or press Esc."));
        }
        Err(err) => {
            device.set_suppressed(false);
            say(&format!("Error: {err}"));
        }
    }
}
