//! Domain payload types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Canonical Enums (used across all crates)
// ============================================================================

/// Activity state - whether a machine is currently in production.
/// This is the CANONICAL definition - use this everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    /// Machine is producing
    Running,
    /// Machine is on but not producing
    #[default]
    Idle,
    /// Machine is out of production for the day
    NotWorking,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Running => "RUNNING",
            ActivityStatus::Idle => "IDLE",
            ActivityStatus::NotWorking => "NOT_WORKING",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RUNNING" => Ok(ActivityStatus::Running),
            "IDLE" => Ok(ActivityStatus::Idle),
            "NOT_WORKING" => Ok(ActivityStatus::NotWorking),
            _ => Err(format!(
                "Invalid activity status: '{}'. Expected: RUNNING, IDLE, or NOT_WORKING",
                s
            )),
        }
    }
}

/// Health state - physical serviceability, independent of activity.
/// This is the CANONICAL definition - use this everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// Fully serviceable
    #[default]
    Working,
    /// Degraded but usable
    HalfWorking,
    /// Physically broken, cannot run
    Breakdown,
    /// Removed from the floor
    Removed,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Working => "WORKING",
            HealthStatus::HalfWorking => "HALF_WORKING",
            HealthStatus::Breakdown => "BREAKDOWN",
            HealthStatus::Removed => "REMOVED",
        }
    }

    /// A machine may only be started while serviceable.
    pub fn is_serviceable(&self) -> bool {
        !matches!(self, HealthStatus::Breakdown | HealthStatus::Removed)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WORKING" => Ok(HealthStatus::Working),
            "HALF_WORKING" => Ok(HealthStatus::HalfWorking),
            "BREAKDOWN" => Ok(HealthStatus::Breakdown),
            "REMOVED" => Ok(HealthStatus::Removed),
            _ => Err(format!(
                "Invalid health status: '{}'. Expected: WORKING, HALF_WORKING, BREAKDOWN, or REMOVED",
                s
            )),
        }
    }
}

/// Status stored inside a scan slot. NOT_WORKING is recorded as NA in the
/// slot history while the machine record itself keeps NOT_WORKING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStatus {
    Running,
    Idle,
    Na,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Running => "RUNNING",
            ScanStatus::Idle => "IDLE",
            ScanStatus::Na => "NA",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ActivityStatus> for ScanStatus {
    fn from(status: ActivityStatus) -> Self {
        match status {
            ActivityStatus::Running => ScanStatus::Running,
            ActivityStatus::Idle => ScanStatus::Idle,
            ActivityStatus::NotWorking => ScanStatus::Na,
        }
    }
}

/// How a resolved scan is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitMode {
    /// Resolved scan immediately commits RUNNING, subject to the health gate
    AutoRun,
    /// Resolved scan opens a confirmation step
    #[default]
    Interactive,
}

impl SubmitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitMode::AutoRun => "AUTO_RUN",
            SubmitMode::Interactive => "INTERACTIVE",
        }
    }
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubmitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AUTO_RUN" => Ok(SubmitMode::AutoRun),
            "INTERACTIVE" => Ok(SubmitMode::Interactive),
            _ => Err(format!("Invalid submit mode: '{}'", s)),
        }
    }
}

// ============================================================================
// Machine record
// ============================================================================

/// One recent-activity snapshot inside a machine's scan history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    pub time: DateTime<Utc>,
    pub status: ScanStatus,
    pub operator_id: String,
}

/// Bounded three-slot history of recent activity scans.
///
/// Slots fill scan1 -> scan2 -> scan3; once full, later scans overwrite
/// scan3 only. The fill policy itself lives in the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan1: Option<ScanEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan2: Option<ScanEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan3: Option<ScanEntry>,
}

impl ScanSlots {
    pub fn is_empty(&self) -> bool {
        self.scan1.is_none() && self.scan2.is_none() && self.scan3.is_none()
    }

    pub fn clear(&mut self) {
        self.scan1 = None;
        self.scan2 = None;
        self.scan3 = None;
    }
}

/// The unit of tracked equipment. Record casing matches the stored format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Unique id, immutable once created. Doubles as the scannable payload.
    /// Format: SECTION-TYPE-NNN.
    pub id: String,
    pub section: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    #[serde(default)]
    pub model_no: String,
    #[serde(default)]
    pub dept: String,
    /// Free-text label, used for fuzzy matching.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub operational_status: HealthStatus,
    #[serde(default)]
    pub scans: ScanSlots,
    pub last_updated: DateTime<Utc>,
}

impl Machine {
    /// A freshly registered machine: IDLE, healthy, empty history.
    pub fn new(
        id: impl Into<String>,
        section: impl Into<String>,
        machine_type: impl Into<String>,
        name: impl Into<String>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            section: section.into(),
            machine_type: machine_type.into(),
            model_no: String::new(),
            dept: String::new(),
            name: name.into(),
            notes: None,
            status: ActivityStatus::Idle,
            operational_status: HealthStatus::Working,
            scans: ScanSlots::default(),
            last_updated: registered_at,
        }
    }
}

// ============================================================================
// Audit trail
// ============================================================================

/// Immutable append-only audit entry. Created exactly once per accepted
/// state mutation; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub machine_id: String,
    pub operator_name: String,
    pub action: String,
    pub new_value: String,
}

impl AuditRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        machine_id: impl Into<String>,
        operator_name: impl Into<String>,
        action: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            machine_id: machine_id.into(),
            operator_name: operator_name.into(),
            action: action.into(),
            new_value: new_value.into(),
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorRole {
    Admin,
    #[default]
    User,
}

impl OperatorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorRole::Admin => "ADMIN",
            OperatorRole::User => "USER",
        }
    }
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The person holding the scanner. Slots record the id, audit records the
/// display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    /// Login id (email)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: OperatorRole,
}

impl Operator {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: OperatorRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}
