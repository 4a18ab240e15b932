//! Persisted configuration.
//!
//! Stored in `~/.floortrack/config.toml` (FLOORTRACK_HOME overrides the
//! directory). The auto-run flag is the operator-facing switch between
//! instant activity logging and the confirmation flow.

use anyhow::{anyhow, Context, Result};
use floortrack_engine::capture::MIN_SCAN_LEN;
use floortrack_engine::processor::DEFAULT_COOLDOWN_MS;
use floortrack_protocol::paths::{config_file_path, floortrack_home};
use floortrack_protocol::{Operator, OperatorRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: OperatorRole,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            id: "operator@floor".to_string(),
            name: "Floor Operator".to_string(),
            role: OperatorRole::User,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolved scans immediately commit RUNNING (subject to the health gate)
    pub auto_run: bool,
    /// Lock cooldown after an applied mutation, in milliseconds
    pub cooldown_ms: i64,
    /// Minimum buffered length for a raw-device submission
    pub min_scan_len: usize,
    pub operator: OperatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_run: false,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            min_scan_len: MIN_SCAN_LEN,
            operator: OperatorConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).map_err(|err| {
            anyhow!(
                "Failed to parse config file {}: {}. Delete this file to reset.",
                path.display(),
                err
            )
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn operator(&self) -> Operator {
        Operator::new(
            self.operator.id.clone(),
            self.operator.name.clone(),
            self.operator.role,
        )
    }
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved configuration in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable or disable auto-run mode
    #[arg(long, value_name = "BOOL")]
    pub set_auto_run: Option<bool>,

    /// Set the post-mutation lock cooldown in milliseconds
    #[arg(long, value_name = "MS")]
    pub set_cooldown_ms: Option<i64>,

    /// Set the operator display name
    #[arg(long, value_name = "NAME")]
    pub set_operator: Option<String>,

    /// Set the operator id (email)
    #[arg(long, value_name = "EMAIL")]
    pub set_operator_id: Option<String>,
}

/// Run the config command - shows or updates settings.
pub fn run(args: ConfigArgs) -> Result<()> {
    let mut config = Config::load()?;

    let mut changed = false;
    if let Some(auto_run) = args.set_auto_run {
        config.auto_run = auto_run;
        changed = true;
    }
    if let Some(cooldown) = args.set_cooldown_ms {
        if cooldown < 0 {
            return Err(anyhow!("cooldown must be non-negative"));
        }
        config.cooldown_ms = cooldown;
        changed = true;
    }
    if let Some(name) = args.set_operator {
        config.operator.name = name;
        changed = true;
    }
    if let Some(id) = args.set_operator_id {
        config.operator.id = id;
        changed = true;
    }
    if changed {
        config.save()?;
    }

    if args.json {
        let home = floortrack_home();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "home": home.to_string_lossy(),
                "auto_run": config.auto_run,
                "cooldown_ms": config.cooldown_ms,
                "min_scan_len": config.min_scan_len,
                "operator": config.operator,
            }))?
        );
    } else {
        println!("Home:         {}", floortrack_home().display());
        println!("Auto-run:     {}", if config.auto_run { "on" } else { "off" });
        println!("Cooldown:     {} ms", config.cooldown_ms);
        println!("Min scan len: {}", config.min_scan_len);
        println!(
            "Operator:     {} <{}> ({})",
            config.operator.name, config.operator.id, config.operator.role
        );
    }
    Ok(())
}
