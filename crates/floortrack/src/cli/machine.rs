//! Machine registry commands.

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Subcommand;
use floortrack_protocol::naming::{id_token, next_machine_id};
use floortrack_protocol::Machine;
use floortrack_store::MachineStore;

use super::context::{load_catalog, open_registry};
use super::output::{format_time, table};

#[derive(Subcommand, Debug, Clone)]
pub enum MachineAction {
    /// List all registered machines
    List {
        #[arg(long)]
        json: bool,
        /// Only machines in this section
        #[arg(long)]
        section: Option<String>,
    },
    /// Register a new machine (id is generated as SECTION-TYPE-NNN)
    Add {
        /// Section the machine belongs to (must exist in the catalog)
        section: String,
        /// Machine type within the section (must exist in the catalog)
        machine_type: String,
        /// Display name, used for fuzzy matching
        name: String,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, default_value = "")]
        dept: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show one machine
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Remove a machine from the registry
    Remove { id: String },
}

pub fn run(action: MachineAction) -> Result<()> {
    let store = open_registry()?;
    match action {
        MachineAction::List { json, section } => {
            let mut machines = store.list()?;
            if let Some(section) = section {
                let section = id_token(&section);
                machines.retain(|m| id_token(&m.section) == section);
            }
            machines.sort_by(|a, b| a.id.cmp(&b.id));
            if json {
                println!("{}", serde_json::to_string_pretty(&machines)?);
                return Ok(());
            }
            let mut out = table(&["ID", "Name", "Activity", "Health", "Last updated"]);
            for m in &machines {
                out.add_row(vec![
                    m.id.clone(),
                    m.name.clone(),
                    m.status.to_string(),
                    m.operational_status.to_string(),
                    format_time(m.last_updated),
                ]);
            }
            println!("{out}");
            println!("{} machine(s)", machines.len());
        }
        MachineAction::Add {
            section,
            machine_type,
            name,
            model,
            dept,
            notes,
        } => {
            let catalog = load_catalog()?;
            let section_id = id_token(&section);
            if !catalog.sections.iter().any(|s| s.id == section_id) {
                return Err(anyhow!(
                    "Unknown section '{section_id}'. Add it first: floortrack section add {section_id}"
                ));
            }
            let type_token = id_token(&machine_type);
            let type_id = format!("{section_id}-{type_token}");
            if !catalog.machine_types.iter().any(|t| t.id == type_id) {
                return Err(anyhow!(
                    "Unknown machine type '{type_token}' in section '{section_id}'. \
                     Add it first: floortrack type add {type_token} --section {section_id}"
                ));
            }

            let registry = store.list()?;
            let id = next_machine_id(&section_id, &type_token, &registry);
            let mut machine = Machine::new(&id, section_id, type_token, name, Utc::now());
            machine.model_no = model;
            machine.dept = dept;
            machine.notes = notes;
            store.insert(&machine)?;
            println!("Registered {id}");
        }
        MachineAction::Show { id, json } => {
            let machine = store
                .get(&id)?
                .ok_or_else(|| anyhow!("Unknown machine: {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&machine)?);
                return Ok(());
            }
            println!("{}  {}", machine.id, machine.name);
            println!("  Section/Type: {} / {}", machine.section, machine.machine_type);
            println!("  Activity:     {}", machine.status);
            println!("  Health:       {}", machine.operational_status);
            println!("  Last updated: {}", format_time(machine.last_updated));
            for (slot, entry) in [
                ("scan1", &machine.scans.scan1),
                ("scan2", &machine.scans.scan2),
                ("scan3", &machine.scans.scan3),
            ] {
                match entry {
                    Some(entry) => println!(
                        "  {slot}: {} {} by {}",
                        format_time(entry.time),
                        entry.status,
                        entry.operator_id
                    ),
                    None => println!("  {slot}: -"),
                }
            }
        }
        MachineAction::Remove { id } => {
            if store.remove(&id)? {
                println!("Removed {id}");
            } else {
                println!("No such machine: {id}");
            }
        }
    }
    Ok(())
}
