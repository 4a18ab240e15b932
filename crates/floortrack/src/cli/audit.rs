//! Audit trail listing. The trail itself is append-only; this is read-only.

use anyhow::Result;

use super::context::open_audit_log;
use super::output::{format_time, table};

#[derive(Debug, clap::Args)]
pub struct AuditArgs {
    /// Maximum number of records to show (newest first)
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Only records for this machine id
    #[arg(long)]
    pub machine: Option<String>,

    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AuditArgs) -> Result<()> {
    let log = open_audit_log();
    let records = log.read_recent(args.limit, args.machine.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let mut out = table(&["Time", "Machine", "Operator", "Action", "New value"]);
    for record in &records {
        out.add_row(vec![
            format_time(record.timestamp),
            record.machine_id.clone(),
            record.operator_name.clone(),
            record.action.clone(),
            record.new_value.clone(),
        ]);
    }
    println!("{out}");
    println!("{} record(s)", records.len());
    Ok(())
}
