use std::path::PathBuf;
use std::sync::Once;

static CREATE_DIR_WARNED: Once = Once::new();

/// Resolve Floortrack home directory.
///
/// Priority:
/// 1) FLOORTRACK_HOME
/// 2) ~/.floortrack
/// 3) ./.floortrack
pub fn floortrack_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("FLOORTRACK_HOME") {
        return PathBuf::from(override_path);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".floortrack");
    }
    PathBuf::from(".").join(".floortrack")
}

fn ensure_home_dir(home: &PathBuf) {
    if let Err(err) = std::fs::create_dir_all(home) {
        CREATE_DIR_WARNED.call_once(|| {
            eprintln!(
                "Warning: failed to create Floortrack home directory {}: {}. Set FLOORTRACK_HOME to continue.",
                home.display(),
                err
            );
        });
    }
}

/// Default machine registry path: ~/.floortrack/registry.json
pub fn default_registry_path() -> PathBuf {
    let home = floortrack_home();
    ensure_home_dir(&home);
    home.join("registry.json")
}

/// Default catalog path (sections and machine types): ~/.floortrack/catalog.json
pub fn default_catalog_path() -> PathBuf {
    let home = floortrack_home();
    ensure_home_dir(&home);
    home.join("catalog.json")
}

/// Default audit trail path: ~/.floortrack/audit.jsonl
pub fn default_audit_log_path() -> PathBuf {
    let home = floortrack_home();
    ensure_home_dir(&home);
    home.join("audit.jsonl")
}

/// Default logs directory: ~/.floortrack/logs
pub fn default_logs_dir() -> PathBuf {
    let home = floortrack_home();
    ensure_home_dir(&home);
    home.join("logs")
}

/// Config file path: ~/.floortrack/config.toml
pub fn config_file_path() -> PathBuf {
    floortrack_home().join("config.toml")
}
