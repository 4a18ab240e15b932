use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use floortrack_protocol::{ActivityStatus, HealthStatus, Machine, ScanSlots};
use thiserror::Error;

/// Parsed machine store URL.
#[derive(Debug, Clone)]
pub enum StoreUrl {
    Json(PathBuf),
    Memory,
}

impl StoreUrl {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if let Some(rest) = raw.strip_prefix("json:") {
            let path = rest.trim();
            if path.is_empty() {
                return Err(StoreError::InvalidUrl(format!(
                    "json URL missing path: {raw}"
                )));
            }
            return Ok(Self::Json(PathBuf::from(path)));
        }
        if raw == "memory:" {
            return Ok(Self::Memory);
        }
        Err(StoreError::InvalidUrl(format!(
            "Unsupported machine store URL: {raw}"
        )))
    }
}

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown machine: {0}")]
    NotFound(String),

    #[error("Machine already registered: {0}")]
    AlreadyExists(String),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt registry {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single-record field replace issued against the registry.
///
/// Exactly one logical field changes per patch; the attendant bookkeeping
/// (scan history, lastUpdated) travels with it so the backend stays a dumb
/// replace with no transition logic of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum MachinePatch {
    /// Activity scan: new status plus the already-rotated slot history.
    Activity {
        status: ActivityStatus,
        scans: ScanSlots,
        last_updated: DateTime<Utc>,
    },
    /// Health correction; slots untouched.
    Health {
        status: HealthStatus,
        last_updated: DateTime<Utc>,
    },
    /// Start-of-day reset: new activity, slots cleared.
    DayReset {
        status: ActivityStatus,
        last_updated: DateTime<Utc>,
    },
}

impl MachinePatch {
    /// Apply this patch to an owned machine snapshot.
    pub fn apply_to(&self, machine: &mut Machine) {
        match self {
            MachinePatch::Activity {
                status,
                scans,
                last_updated,
            } => {
                machine.status = *status;
                machine.scans = scans.clone();
                machine.last_updated = *last_updated;
            }
            MachinePatch::Health {
                status,
                last_updated,
            } => {
                machine.operational_status = *status;
                machine.last_updated = *last_updated;
            }
            MachinePatch::DayReset {
                status,
                last_updated,
            } => {
                machine.status = *status;
                machine.scans.clear();
                machine.last_updated = *last_updated;
            }
        }
    }
}

/// Registry contract consumed by the engine and the CLI.
///
/// `update` is a blind per-record replace: the backend does not detect or
/// resolve concurrent edits from other terminals (last write wins).
pub trait MachineStore: Send + Sync {
    /// Snapshot read of every registered machine.
    fn list(&self) -> Result<Vec<Machine>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Machine>, StoreError>;

    fn insert(&self, machine: &Machine) -> Result<(), StoreError>;

    /// Returns true if the machine existed.
    fn remove(&self, id: &str) -> Result<bool, StoreError>;

    fn update(&self, id: &str, patch: &MachinePatch) -> Result<(), StoreError>;
}

/// Open a machine store from a URL string.
pub fn open_machine_store(raw: &str) -> Result<Box<dyn MachineStore>, StoreError> {
    match StoreUrl::parse(raw)? {
        StoreUrl::Json(path) => Ok(Box::new(crate::json::JsonMachineStore::new(path))),
        StoreUrl::Memory => Ok(Box::new(crate::memory::MemoryMachineStore::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_url_parse() {
        assert!(matches!(
            StoreUrl::parse("json:/tmp/registry.json"),
            Ok(StoreUrl::Json(_))
        ));
        assert!(matches!(StoreUrl::parse("memory:"), Ok(StoreUrl::Memory)));
        assert!(StoreUrl::parse("json:").is_err());
        assert!(StoreUrl::parse("sqlite:/tmp/x.db").is_err());
    }
}
