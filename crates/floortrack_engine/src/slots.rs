//! Scan slot rotation.
//!
//! Slots fill scan1 -> scan2 -> scan3; once all three are occupied, every
//! subsequent activity scan overwrites scan3 and scan1/scan2 are frozen.
//! Not a circular/FIFO log: the first two slots keep the earliest scans of
//! the shift, the third tracks the latest.

use chrono::{DateTime, Utc};
use floortrack_protocol::{ActivityStatus, ScanEntry, ScanSlots};
use std::fmt;

/// Which slot an activity scan landed in. Used in audit actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotName {
    Scan1,
    Scan2,
    Scan3,
}

impl SlotName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Scan1 => "scan1",
            SlotName::Scan2 => "scan2",
            SlotName::Scan3 => "scan3",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record an activity scan into the first empty slot, else scan3.
pub fn record_activity(
    slots: &mut ScanSlots,
    status: ActivityStatus,
    operator_id: &str,
    time: DateTime<Utc>,
) -> SlotName {
    let entry = ScanEntry {
        time,
        status: status.into(),
        operator_id: operator_id.to_string(),
    };
    if slots.scan1.is_none() {
        slots.scan1 = Some(entry);
        SlotName::Scan1
    } else if slots.scan2.is_none() {
        slots.scan2 = Some(entry);
        SlotName::Scan2
    } else {
        slots.scan3 = Some(entry);
        SlotName::Scan3
    }
}
