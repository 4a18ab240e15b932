//! Machine registry and audit trail backends.
//!
//! The engine only ever sees the [`MachineStore`] and [`AuditSink`] traits;
//! concrete backends provide simple read/replace semantics per record, not
//! multi-record transactions. A write is a blind field replace: if another
//! terminal mutated the same record concurrently, last write wins.

pub mod audit;
pub mod catalog;
pub mod json;
pub mod memory;
mod store;

pub use audit::{AuditError, AuditSink, JsonlAuditLog, MemoryAuditLog};
pub use catalog::{Catalog, CatalogError, MachineType, Section};
pub use json::JsonMachineStore;
pub use memory::MemoryMachineStore;
pub use store::{open_machine_store, MachinePatch, MachineStore, StoreError, StoreUrl};
