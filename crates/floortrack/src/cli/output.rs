//! Output formatting helpers for CLI commands.

use chrono::{DateTime, Local, Utc};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

/// Build a condensed table with the given header.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Local wall-clock rendering of a stored UTC timestamp.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
