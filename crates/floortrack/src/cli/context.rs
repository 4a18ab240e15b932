//! Shared wiring for commands that touch the registry and audit trail.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use floortrack_engine::ScanProcessor;
use floortrack_protocol::paths::{default_audit_log_path, default_catalog_path, default_registry_path};
use floortrack_store::{open_machine_store, Catalog, JsonlAuditLog, MachineStore};

use super::config::Config;

/// Open the machine registry. FLOORTRACK_STORE_URL overrides the default
/// file-backed store (`json:<path>` or `memory:`).
pub fn open_registry() -> Result<Arc<dyn MachineStore>> {
    let url = std::env::var("FLOORTRACK_STORE_URL")
        .unwrap_or_else(|_| format!("json:{}", default_registry_path().display()));
    let store = open_machine_store(&url)
        .with_context(|| format!("Failed to open machine store {url}"))?;
    Ok(Arc::from(store))
}

/// Open the append-only audit trail at its default location.
pub fn open_audit_log() -> Arc<JsonlAuditLog> {
    Arc::new(JsonlAuditLog::new(default_audit_log_path()))
}

/// Load the section/type catalog.
pub fn load_catalog() -> Result<Catalog> {
    Ok(Catalog::load(&default_catalog_path())?)
}

pub fn save_catalog(catalog: &Catalog) -> Result<()> {
    Ok(catalog.save(&default_catalog_path())?)
}

/// Build the scan processor from persisted configuration.
pub fn build_processor(config: &Config) -> Result<ScanProcessor> {
    Ok(
        ScanProcessor::new(open_registry()?, open_audit_log(), config.operator())
            .with_cooldown(Duration::milliseconds(config.cooldown_ms)),
    )
}
