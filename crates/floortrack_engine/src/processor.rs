//! The orchestrating state machine.
//!
//! One submission at a time, system-wide: a submission arriving while a
//! prior one is resolving, awaiting confirmation, applying, or still inside
//! the post-mutation cooldown window is dropped entirely - no queue, no
//! retry. Accepted mutations therefore commit in submission order.
//!
//! The machine write and the audit append are two sequential calls. When
//! the write lands but the append fails, the state change is NOT rolled
//! back; the gap is surfaced as a non-fatal warning instead of hidden.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use floortrack_protocol::{
    ActivityStatus, AuditRecord, HealthStatus, Machine, Operator, SubmitMode,
};
use floortrack_store::{AuditError, AuditSink, MachinePatch, MachineStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::health;
use crate::resolver;
use crate::slots;

/// Lock cooldown after an applied mutation. Double-trigger scans from
/// keyboard-wedge devices land well inside this window.
pub const DEFAULT_COOLDOWN_MS: i64 = 2_000;

/// Errors local to one submission. None are fatal; the processor always
/// returns to idle listening after surfacing one.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No machine found matching \"{0}\"")]
    NotFound(String),

    #[error("Machine unserviceable: health is {0}")]
    HealthBlocked(HealthStatus),

    #[error("Store write failed: {0}")]
    StoreWrite(#[from] StoreError),

    #[error("Machine state updated but audit append failed: {0}")]
    AuditWrite(#[from] AuditError),

    #[error("No scan is awaiting confirmation")]
    NoPendingScan,
}

/// One resolution-to-confirmation cycle, parked while the operator decides.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingScan {
    pub machine_id: String,
    pub machine_name: String,
    pub raw_input: String,
    /// Set when auto-run was diverted here by the health gate.
    pub blocked: Option<HealthStatus>,
    pub opened_at: DateTime<Utc>,
}

/// Explicit session state; every transition is observable and
/// unit-testable, with no ambient processing flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Resolving,
    AwaitingConfirmation(PendingScan),
    Applying,
}

/// A committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub machine_id: String,
    pub action: String,
    pub new_value: String,
    /// False when the machine write landed but the audit append failed.
    pub audit_logged: bool,
}

/// What became of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Lock held; the submission was dropped entirely.
    Dropped,
    /// Auto-run committed RUNNING.
    Applied(Applied),
    /// Confirmation opened: interactive mode, or auto-run diverted by the
    /// health gate (never silently overridden).
    AwaitingConfirmation {
        machine_id: String,
        diverted: Option<HealthStatus>,
    },
}

/// Scan event processor: resolve, gate, apply exactly once, audit.
pub struct ScanProcessor {
    store: Arc<dyn MachineStore>,
    audit: Arc<dyn AuditSink>,
    operator: Operator,
    cooldown: Duration,
    state: SessionState,
    locked_until: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl ScanProcessor {
    pub fn new(store: Arc<dyn MachineStore>, audit: Arc<dyn AuditSink>, operator: Operator) -> Self {
        Self {
            store,
            audit,
            operator,
            cooldown: Duration::milliseconds(DEFAULT_COOLDOWN_MS),
            state: SessionState::Idle,
            locked_until: None,
            last_error: None,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingScan> {
        match &self.state {
            SessionState::AwaitingConfirmation(pending) => Some(pending),
            _ => None,
        }
    }

    /// Observable processing/locked flag for UI feedback.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        if !matches!(self.state, SessionState::Idle) {
            return true;
        }
        self.locked_until.map_or(false, |until| now < until)
    }

    /// Observable last-error signal for UI feedback.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn submit(&mut self, raw: &str, mode: SubmitMode) -> Result<SubmitOutcome, EngineError> {
        self.submit_at(raw, mode, Utc::now())
    }

    /// Submit a raw identifier at an explicit instant.
    pub fn submit_at(
        &mut self,
        raw: &str,
        mode: SubmitMode,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, EngineError> {
        if self.is_locked(now) {
            debug!(raw, "submission dropped while locked");
            return Ok(SubmitOutcome::Dropped);
        }

        self.state = SessionState::Resolving;
        let registry = match self.store.list() {
            Ok(registry) => registry,
            Err(err) => return Err(self.fail(err.into())),
        };

        let machine = match resolver::resolve(raw, &registry) {
            Some(machine) => machine.clone(),
            None => return Err(self.fail(EngineError::NotFound(raw.to_string()))),
        };

        match mode {
            SubmitMode::AutoRun => {
                if let Err(health) =
                    health::check_activity(machine.operational_status, ActivityStatus::Running)
                {
                    // auto-run is never silently overridden: divert to the
                    // interactive flow so the operator sees the health state
                    warn!(
                        machine = %machine.id,
                        health = %health,
                        "auto-run bypassed: machine unserviceable"
                    );
                    self.last_error = Some(EngineError::HealthBlocked(health).to_string());
                    return Ok(self.park(machine, raw, Some(health), now));
                }
                let applied =
                    self.apply_activity(&machine, ActivityStatus::Running, now)?;
                Ok(SubmitOutcome::Applied(applied))
            }
            SubmitMode::Interactive => Ok(self.park(machine, raw, None, now)),
        }
    }

    /// Operator confirmed an activity choice on the open scan.
    pub fn confirm_activity(&mut self, status: ActivityStatus) -> Result<Applied, EngineError> {
        self.confirm_activity_at(status, Utc::now())
    }

    pub fn confirm_activity_at(
        &mut self,
        status: ActivityStatus,
        now: DateTime<Utc>,
    ) -> Result<Applied, EngineError> {
        let pending = self.pending().cloned().ok_or(EngineError::NoPendingScan)?;
        let machine = match self.fetch(&pending.machine_id) {
            Ok(machine) => machine,
            Err(err) => return Err(self.fail(err)),
        };

        if let Err(health) = health::check_activity(machine.operational_status, status) {
            // stay parked: the operator must correct health or ignore
            let err = EngineError::HealthBlocked(health);
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        let applied = self.apply_activity(&machine, status, now)?;
        Ok(applied)
    }

    /// Operator confirmed a health choice on the open scan.
    pub fn confirm_health(&mut self, status: HealthStatus) -> Result<Applied, EngineError> {
        self.confirm_health_at(status, Utc::now())
    }

    pub fn confirm_health_at(
        &mut self,
        status: HealthStatus,
        now: DateTime<Utc>,
    ) -> Result<Applied, EngineError> {
        let pending = self.pending().cloned().ok_or(EngineError::NoPendingScan)?;
        let machine = match self.fetch(&pending.machine_id) {
            Ok(machine) => machine,
            Err(err) => return Err(self.fail(err)),
        };

        self.state = SessionState::Applying;
        let patch = MachinePatch::Health {
            status,
            last_updated: now,
        };
        if let Err(err) = self.store.update(&machine.id, &patch) {
            return Err(self.fail(err.into()));
        }
        info!(machine = %machine.id, health = %status, "health updated");

        let record = AuditRecord::new(
            now,
            &machine.id,
            &self.operator.name,
            "Health updated",
            status.as_str(),
        );
        let audit_logged = self.append_audit(&record);

        self.release_with_cooldown(now);
        Ok(Applied {
            machine_id: machine.id,
            action: record.action,
            new_value: record.new_value,
            audit_logged,
        })
    }

    /// Discard the open scan: no mutation, no audit record, lock released
    /// immediately. Returns false when nothing was awaiting confirmation.
    pub fn ignore(&mut self) -> bool {
        match self.state {
            SessionState::AwaitingConfirmation(_) => {
                debug!("scan ignored by operator");
                self.state = SessionState::Idle;
                self.locked_until = None;
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    fn park(
        &mut self,
        machine: Machine,
        raw: &str,
        blocked: Option<HealthStatus>,
        now: DateTime<Utc>,
    ) -> SubmitOutcome {
        let pending = PendingScan {
            machine_id: machine.id.clone(),
            machine_name: machine.name,
            raw_input: raw.to_string(),
            blocked,
            opened_at: now,
        };
        self.state = SessionState::AwaitingConfirmation(pending);
        SubmitOutcome::AwaitingConfirmation {
            machine_id: machine.id,
            diverted: blocked,
        }
    }

    /// Apply one activity write plus its slot bookkeeping, then audit.
    fn apply_activity(
        &mut self,
        machine: &Machine,
        status: ActivityStatus,
        now: DateTime<Utc>,
    ) -> Result<Applied, EngineError> {
        self.state = SessionState::Applying;

        let mut scans = machine.scans.clone();
        let slot = slots::record_activity(&mut scans, status, &self.operator.id, now);
        let patch = MachinePatch::Activity {
            status,
            scans,
            last_updated: now,
        };
        if let Err(err) = self.store.update(&machine.id, &patch) {
            return Err(self.fail(err.into()));
        }
        info!(machine = %machine.id, status = %status, slot = %slot, "activity applied");

        let record = AuditRecord::new(
            now,
            &machine.id,
            &self.operator.name,
            format!("Scanned slot {slot}"),
            status.as_str(),
        );
        let audit_logged = self.append_audit(&record);

        self.release_with_cooldown(now);
        Ok(Applied {
            machine_id: machine.id.clone(),
            action: record.action,
            new_value: record.new_value,
            audit_logged,
        })
    }

    /// Append the audit record; a failure is surfaced but never rolls back
    /// the machine write that preceded it.
    fn append_audit(&mut self, record: &AuditRecord) -> bool {
        match self.audit.append(record) {
            Ok(()) => true,
            Err(err) => {
                let err = EngineError::AuditWrite(err);
                warn!(machine = %record.machine_id, "{err}");
                self.last_error = Some(err.to_string());
                false
            }
        }
    }

    fn fetch(&self, id: &str) -> Result<Machine, EngineError> {
        self.store
            .get(id)?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    fn release_with_cooldown(&mut self, now: DateTime<Utc>) {
        self.state = SessionState::Idle;
        self.locked_until = Some(now + self.cooldown);
    }

    /// Surface an error, return to idle listening, release the lock.
    fn fail(&mut self, err: EngineError) -> EngineError {
        warn!("{err}");
        self.last_error = Some(err.to_string());
        self.state = SessionState::Idle;
        self.locked_until = None;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floortrack_protocol::OperatorRole;
    use floortrack_store::{MemoryAuditLog, MemoryMachineStore};

    fn operator() -> Operator {
        Operator::new("dana@floor", "Dana", OperatorRole::User)
    }

    fn machine(id: &str, name: &str, health: HealthStatus) -> Machine {
        let mut machine = Machine::new(id, "CUT", "LASER", name, Utc::now());
        machine.operational_status = health;
        machine
    }

    fn processor(machines: Vec<Machine>) -> (ScanProcessor, Arc<MemoryMachineStore>, Arc<MemoryAuditLog>) {
        let store = Arc::new(MemoryMachineStore::with_machines(machines));
        let audit = Arc::new(MemoryAuditLog::default());
        let processor = ScanProcessor::new(store.clone(), audit.clone(), operator());
        (processor, store, audit)
    }

    #[test]
    fn test_auto_run_applies_exactly_once() {
        let (mut processor, store, audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Working,
        )]);
        let now = Utc::now();

        let outcome = processor
            .submit_at("CUT-LASER-001", SubmitMode::AutoRun, now)
            .unwrap();
        let applied = match outcome {
            SubmitOutcome::Applied(applied) => applied,
            other => panic!("expected Applied, got {other:?}"),
        };
        assert_eq!(applied.new_value, "RUNNING");
        assert!(applied.audit_logged);

        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        assert_eq!(stored.status, ActivityStatus::Running);
        assert_eq!(stored.scans.scan1.as_ref().unwrap().operator_id, "dana@floor");
        assert_eq!(audit.records().len(), 1);
        assert_eq!(audit.records()[0].action, "Scanned slot scan1");
    }

    #[test]
    fn test_not_found_makes_no_writes() {
        let (mut processor, store, audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Working,
        )]);

        let err = processor
            .submit_at("FORKLIFT-9", SubmitMode::AutoRun, Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(processor.last_error().unwrap().contains("FORKLIFT-9"));

        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        assert_eq!(stored.status, ActivityStatus::Idle);
        assert!(audit.records().is_empty());
        // error is local to the submission; back to idle listening
        assert_eq!(*processor.state(), SessionState::Idle);
        assert!(!processor.is_locked(Utc::now() + Duration::seconds(10)));
    }

    #[test]
    fn test_auto_run_diverted_while_broken() {
        let (mut processor, store, audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Breakdown,
        )]);
        let now = Utc::now();

        let outcome = processor
            .submit_at("CUT-LASER-001", SubmitMode::AutoRun, now)
            .unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::AwaitingConfirmation {
                machine_id: "CUT-LASER-001".to_string(),
                diverted: Some(HealthStatus::Breakdown),
            }
        );
        assert!(processor.last_error().unwrap().contains("BREAKDOWN"));

        // never sets RUNNING silently
        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        assert_eq!(stored.status, ActivityStatus::Idle);
        assert!(audit.records().is_empty());
        assert!(processor.pending().unwrap().blocked.is_some());
    }

    #[test]
    fn test_confirm_running_blocked_until_health_fixed() {
        let (mut processor, _store, _audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Breakdown,
        )]);
        let now = Utc::now();
        processor
            .submit_at("CUT-LASER-001", SubmitMode::Interactive, now)
            .unwrap();

        let err = processor
            .confirm_activity_at(ActivityStatus::Running, now)
            .unwrap_err();
        assert!(matches!(err, EngineError::HealthBlocked(HealthStatus::Breakdown)));
        // still parked: the operator can fix health or ignore
        assert!(processor.pending().is_some());

        let applied = processor
            .confirm_health_at(HealthStatus::Working, now)
            .unwrap();
        assert_eq!(applied.new_value, "WORKING");
        assert_eq!(*processor.state(), SessionState::Idle);
    }

    #[test]
    fn test_submissions_dropped_inside_cooldown() {
        let (mut processor, store, audit) = processor(vec![
            machine("CUT-LASER-001", "Aurora 001", HealthStatus::Working),
            machine("SEW-JUKI-001", "Juki 1", HealthStatus::Working),
        ]);
        let now = Utc::now();

        let first = processor
            .submit_at("CUT-LASER-001", SubmitMode::AutoRun, now)
            .unwrap();
        assert!(matches!(first, SubmitOutcome::Applied(_)));

        // same machine, inside the cooldown window
        let second = processor
            .submit_at("CUT-LASER-001", SubmitMode::AutoRun, now + Duration::milliseconds(200))
            .unwrap();
        assert_eq!(second, SubmitOutcome::Dropped);

        // the debounce is global, not per-machine
        let third = processor
            .submit_at("SEW-JUKI-001", SubmitMode::AutoRun, now + Duration::milliseconds(400))
            .unwrap();
        assert_eq!(third, SubmitOutcome::Dropped);

        assert_eq!(audit.records().len(), 1);
        let juki = store.get("SEW-JUKI-001").unwrap().unwrap();
        assert_eq!(juki.status, ActivityStatus::Idle);

        // past the cooldown, submissions flow again
        let fourth = processor
            .submit_at("SEW-JUKI-001", SubmitMode::AutoRun, now + Duration::seconds(3))
            .unwrap();
        assert!(matches!(fourth, SubmitOutcome::Applied(_)));
    }

    #[test]
    fn test_submissions_dropped_while_awaiting_confirmation() {
        let (mut processor, _store, audit) = processor(vec![
            machine("CUT-LASER-001", "Aurora 001", HealthStatus::Working),
            machine("SEW-JUKI-001", "Juki 1", HealthStatus::Working),
        ]);
        let now = Utc::now();
        processor
            .submit_at("CUT-LASER-001", SubmitMode::Interactive, now)
            .unwrap();

        // parked with no timeout; later submissions are dropped
        let outcome = processor
            .submit_at("SEW-JUKI-001", SubmitMode::AutoRun, now + Duration::minutes(30))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Dropped);
        assert!(audit.records().is_empty());
    }

    #[test]
    fn test_ignore_releases_lock_without_mutation() {
        let (mut processor, store, audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Working,
        )]);
        let now = Utc::now();
        processor
            .submit_at("CUT-LASER-001", SubmitMode::Interactive, now)
            .unwrap();

        assert!(processor.ignore());
        assert_eq!(*processor.state(), SessionState::Idle);
        // no cooldown after ignore: nothing was written
        assert!(!processor.is_locked(now));
        assert!(audit.records().is_empty());
        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        assert!(stored.scans.is_empty());

        // ignore with nothing open is a no-op
        assert!(!processor.ignore());
    }

    #[test]
    fn test_interactive_confirm_idle() {
        let (mut processor, store, audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::HalfWorking,
        )]);
        let now = Utc::now();
        processor
            .submit_at("aurora", SubmitMode::Interactive, now)
            .unwrap();
        let applied = processor
            .confirm_activity_at(ActivityStatus::Idle, now)
            .unwrap();
        assert_eq!(applied.new_value, "IDLE");

        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        assert_eq!(stored.status, ActivityStatus::Idle);
        assert_eq!(audit.records().len(), 1);
        // one committed mutation per resolved submission
        assert!(matches!(
            processor.confirm_activity_at(ActivityStatus::Running, now),
            Err(EngineError::NoPendingScan)
        ));
    }

    #[test]
    fn test_audit_failure_does_not_roll_back() {
        use floortrack_protocol::AuditRecord;

        struct FailingAudit;
        impl AuditSink for FailingAudit {
            fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
                Err(AuditError::Append {
                    path: "/dev/full".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                })
            }
        }

        let store = Arc::new(MemoryMachineStore::with_machines(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Working,
        )]));
        let mut processor =
            ScanProcessor::new(store.clone(), Arc::new(FailingAudit), operator());

        let outcome = processor
            .submit_at("CUT-LASER-001", SubmitMode::AutoRun, Utc::now())
            .unwrap();
        let applied = match outcome {
            SubmitOutcome::Applied(applied) => applied,
            other => panic!("expected Applied, got {other:?}"),
        };
        // machine write kept, gap surfaced
        assert!(!applied.audit_logged);
        assert!(processor.last_error().unwrap().contains("audit append failed"));
        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        assert_eq!(stored.status, ActivityStatus::Running);
    }

    #[test]
    fn test_store_failure_surfaces_and_unlocks() {
        struct FailingStore;
        impl MachineStore for FailingStore {
            fn list(&self) -> Result<Vec<Machine>, StoreError> {
                Ok(vec![machine("CUT-LASER-001", "Aurora 001", HealthStatus::Working)])
            }
            fn get(&self, id: &str) -> Result<Option<Machine>, StoreError> {
                let _ = id;
                Ok(Some(machine("CUT-LASER-001", "Aurora 001", HealthStatus::Working)))
            }
            fn insert(&self, _machine: &Machine) -> Result<(), StoreError> {
                unimplemented!()
            }
            fn remove(&self, _id: &str) -> Result<bool, StoreError> {
                unimplemented!()
            }
            fn update(&self, id: &str, _patch: &MachinePatch) -> Result<(), StoreError> {
                Err(StoreError::NotFound(id.to_string()))
            }
        }

        let audit = Arc::new(MemoryAuditLog::default());
        let mut processor =
            ScanProcessor::new(Arc::new(FailingStore), audit.clone(), operator());
        let now = Utc::now();

        let err = processor
            .submit_at("CUT-LASER-001", SubmitMode::AutoRun, now)
            .unwrap_err();
        assert!(matches!(err, EngineError::StoreWrite(_)));
        // no audit entry for a rejected write; operator retries manually
        assert!(audit.records().is_empty());
        assert_eq!(*processor.state(), SessionState::Idle);
        assert!(!processor.is_locked(now));
    }

    #[test]
    fn test_four_scans_freeze_first_two_slots() {
        let (mut processor, store, _audit) = processor(vec![machine(
            "CUT-LASER-001",
            "Aurora 001",
            HealthStatus::Working,
        )]);
        let mut now = Utc::now();

        for _ in 0..4 {
            now = now + Duration::seconds(10);
            let outcome = processor
                .submit_at("CUT-LASER-001", SubmitMode::AutoRun, now)
                .unwrap();
            assert!(matches!(outcome, SubmitOutcome::Applied(_)));
        }

        let stored = store.get("CUT-LASER-001").unwrap().unwrap();
        let scan1 = stored.scans.scan1.as_ref().unwrap();
        let scan3 = stored.scans.scan3.as_ref().unwrap();
        assert!(scan1.time < scan3.time);
        // fourth scan overwrote scan3
        assert_eq!(scan3.time, now);
    }
}
