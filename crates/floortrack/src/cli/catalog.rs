//! Section and machine-type catalog commands.

use anyhow::Result;
use clap::Subcommand;

use super::context::{load_catalog, save_catalog};
use super::output::table;

#[derive(Subcommand, Debug, Clone)]
pub enum SectionAction {
    /// List sections
    List,
    /// Add a section
    Add { name: String },
    /// Remove a section and its machine types
    Remove { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TypeAction {
    /// List machine types
    List {
        /// Only types in this section
        #[arg(long)]
        section: Option<String>,
    },
    /// Add a machine type to a section
    Add {
        name: String,
        #[arg(long)]
        section: String,
    },
    /// Remove a machine type
    Remove { id: String },
}

pub fn run_section(action: SectionAction) -> Result<()> {
    let mut catalog = load_catalog()?;
    match action {
        SectionAction::List => {
            let mut out = table(&["Section"]);
            for section in &catalog.sections {
                out.add_row(vec![section.name.clone()]);
            }
            println!("{out}");
        }
        SectionAction::Add { name } => {
            let section = catalog.add_section(&name)?;
            save_catalog(&catalog)?;
            println!("Section {}", section.id);
        }
        SectionAction::Remove { id } => {
            if catalog.remove_section(&id) {
                save_catalog(&catalog)?;
                println!("Removed section {id}");
            } else {
                println!("No such section: {id}");
            }
        }
    }
    Ok(())
}

pub fn run_type(action: TypeAction) -> Result<()> {
    let mut catalog = load_catalog()?;
    match action {
        TypeAction::List { section } => {
            let mut out = table(&["Type", "Section"]);
            for mt in &catalog.machine_types {
                if let Some(section) = &section {
                    if !mt.section_id.eq_ignore_ascii_case(section.trim()) {
                        continue;
                    }
                }
                out.add_row(vec![mt.name.clone(), mt.section_id.clone()]);
            }
            println!("{out}");
        }
        TypeAction::Add { name, section } => {
            let mt = catalog.add_machine_type(&name, &section)?;
            save_catalog(&catalog)?;
            println!("Machine type {}", mt.id);
        }
        TypeAction::Remove { id } => {
            if catalog.remove_machine_type(&id) {
                save_catalog(&catalog)?;
                println!("Removed machine type {id}");
            } else {
                println!("No such machine type: {id}");
            }
        }
    }
    Ok(())
}
