//! Append-only audit trail.
//!
//! The sink contract is append-only; nothing in this workspace mutates or
//! deletes an audit record once written. A failed append does not roll back
//! the machine write that preceded it - the engine surfaces the gap instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use floortrack_protocol::AuditRecord;
use thiserror::Error;

/// Errors from audit trail operations.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to append audit record to {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read audit trail {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt audit record in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Append-only sink contract consumed by the engine.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// One JSON record per line, appended to a single file.
pub struct JsonlAuditLog {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl JsonlAuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_guard: Mutex::new(()),
        }
    }

    /// Read back records, newest first, optionally filtered by machine id.
    pub fn read_recent(
        &self,
        limit: usize,
        machine_id: Option<&str>,
    ) -> Result<Vec<AuditRecord>, AuditError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(AuditError::Read {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };

        let mut records = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord =
                serde_json::from_str(line).map_err(|err| AuditError::Corrupt {
                    path: self.path.clone(),
                    source: err,
                })?;
            if let Some(id) = machine_id {
                if record.machine_id != id {
                    continue;
                }
            }
            records.push(record);
        }
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let line = serde_json::to_string(record).map_err(|err| AuditError::Corrupt {
            path: self.path.clone(),
            source: err,
        })?;
        let _guard = self.write_guard.lock().expect("audit write lock");
        let append = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", line));
        append.map_err(|err| AuditError::Append {
            path: self.path.clone(),
            source: err,
        })
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit lock").clone()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.lock().expect("audit lock").push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read_back_newest_first() {
        let dir = TempDir::new().unwrap();
        let log = JsonlAuditLog::new(dir.path().join("audit.jsonl"));

        for n in 1..=3 {
            let record = AuditRecord::new(
                Utc::now(),
                "CUT-LASER-001",
                "Dana",
                format!("Scanned slot scan{n}"),
                "RUNNING",
            );
            log.append(&record).unwrap();
        }

        let records = log.read_recent(10, None).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].action, "Scanned slot scan3");
        assert_eq!(records[2].action, "Scanned slot scan1");
    }

    #[test]
    fn test_read_recent_filters_and_limits() {
        let dir = TempDir::new().unwrap();
        let log = JsonlAuditLog::new(dir.path().join("audit.jsonl"));
        for id in ["A-1", "B-1", "A-1", "A-1"] {
            log.append(&AuditRecord::new(Utc::now(), id, "Dana", "Scanned slot scan1", "IDLE"))
                .unwrap();
        }
        assert_eq!(log.read_recent(10, Some("A-1")).unwrap().len(), 3);
        assert_eq!(log.read_recent(2, Some("A-1")).unwrap().len(), 2);
        assert!(log.read_recent(10, Some("C-1")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let log = JsonlAuditLog::new(dir.path().join("audit.jsonl"));
        assert!(log.read_recent(10, None).unwrap().is_empty());
    }
}
