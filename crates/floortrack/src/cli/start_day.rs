//! Start-of-day reset command.

use anyhow::Result;
use chrono::Utc;
use floortrack_engine::start_day;

use super::context::open_registry;

#[derive(Debug, clap::Args)]
pub struct StartDayArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: StartDayArgs) -> Result<()> {
    if !args.yes {
        println!("This clears every machine's scan history and returns the floor to IDLE.");
        print!("Continue? [y/N] ");
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let store = open_registry()?;
    let touched = start_day(store.as_ref(), Utc::now())?;
    println!("Reset {touched} machine(s) for the new shift.");
    Ok(())
}
