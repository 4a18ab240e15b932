//! Scan event resolution and machine state transition engine.
//!
//! Turns an arbitrary scanned/typed identifier into a validated machine,
//! decides what state change is permitted, applies it exactly once, and
//! records an append-only audit entry. Processing is single-threaded and
//! event-driven: one global lock serializes submissions, so accepted
//! mutations commit in submission order and anything arriving while locked
//! is dropped, not queued.

pub mod capture;
pub mod day;
pub mod health;
pub mod processor;
pub mod resolver;
pub mod slots;

pub use capture::{InputCapability, InputEvent, InputSource, ManualFieldSource, RawDeviceSource};
pub use day::start_day;
pub use processor::{
    Applied, EngineError, PendingScan, ScanProcessor, SessionState, SubmitOutcome,
};
pub use slots::SlotName;
