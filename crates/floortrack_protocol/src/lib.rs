//! Canonical domain types for Floortrack.
//!
//! Every crate in the workspace speaks these types. Enums defined here are
//! the single source of truth for wire casing (SCREAMING_SNAKE_CASE, matching
//! the stored record format).

pub mod naming;
pub mod paths;
pub mod types;

pub use types::{
    ActivityStatus, AuditRecord, HealthStatus, Machine, Operator, OperatorRole, ScanEntry,
    ScanSlots, ScanStatus, SubmitMode,
};
