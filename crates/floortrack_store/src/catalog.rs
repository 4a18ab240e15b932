//! Section and machine-type catalog.
//!
//! Sections are keyed by their cleaned name; machine types by
//! `SECTION-NAME`. The catalog feeds machine-id generation and registry CRUD.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use floortrack_protocol::naming::id_token;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt catalog {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Section name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineType {
    pub id: String,
    pub name: String,
    pub section_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub machine_types: Vec<MachineType>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(CatalogError::Read {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|err| CatalogError::Corrupt {
            path: path.to_path_buf(),
            source: err,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| CatalogError::Corrupt {
            path: path.to_path_buf(),
            source: err,
        })?;
        fs::write(path, json).map_err(|err| CatalogError::Write {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Add a section; re-adding an existing name is a no-op.
    pub fn add_section(&mut self, name: &str) -> Result<Section, CatalogError> {
        let id = id_token(name);
        if id.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if let Some(existing) = self.sections.iter().find(|s| s.id == id) {
            return Ok(existing.clone());
        }
        let section = Section {
            id: id.clone(),
            name: id,
        };
        self.sections.push(section.clone());
        Ok(section)
    }

    /// Remove a section and every machine type under it.
    pub fn remove_section(&mut self, id: &str) -> bool {
        let id = id_token(id);
        let before = self.sections.len();
        self.sections.retain(|s| s.id != id);
        self.machine_types.retain(|t| t.section_id != id);
        self.sections.len() != before
    }

    pub fn add_machine_type(
        &mut self,
        name: &str,
        section_id: &str,
    ) -> Result<MachineType, CatalogError> {
        let section_id = id_token(section_id);
        if !self.sections.iter().any(|s| s.id == section_id) {
            return Err(CatalogError::UnknownSection(section_id));
        }
        let token = id_token(name);
        if token.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        let id = format!("{}-{}", section_id, token);
        if let Some(existing) = self.machine_types.iter().find(|t| t.id == id) {
            return Ok(existing.clone());
        }
        let machine_type = MachineType {
            id,
            name: token,
            section_id,
        };
        self.machine_types.push(machine_type.clone());
        Ok(machine_type)
    }

    pub fn remove_machine_type(&mut self, id: &str) -> bool {
        let id = id_token(id);
        let before = self.machine_types.len();
        self.machine_types.retain(|t| t.id != id);
        self.machine_types.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_section_dedupes_on_cleaned_name() {
        let mut catalog = Catalog::default();
        catalog.add_section("cutting").unwrap();
        catalog.add_section(" CUTTING ").unwrap();
        assert_eq!(catalog.sections.len(), 1);
        assert_eq!(catalog.sections[0].id, "CUTTING");
    }

    #[test]
    fn test_machine_type_requires_section() {
        let mut catalog = Catalog::default();
        assert!(matches!(
            catalog.add_machine_type("LASER", "CUTTING"),
            Err(CatalogError::UnknownSection(_))
        ));
        catalog.add_section("CUTTING").unwrap();
        let mt = catalog.add_machine_type("laser", "CUTTING").unwrap();
        assert_eq!(mt.id, "CUTTING-LASER");
    }

    #[test]
    fn test_remove_section_drops_its_types() {
        let mut catalog = Catalog::default();
        catalog.add_section("CUTTING").unwrap();
        catalog.add_machine_type("LASER", "CUTTING").unwrap();
        assert!(catalog.remove_section("CUTTING"));
        assert!(catalog.machine_types.is_empty());
    }

    #[test]
    fn test_catalog_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let mut catalog = Catalog::default();
        catalog.add_section("SEWING").unwrap();
        catalog.add_machine_type("JUKI", "SEWING").unwrap();
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.sections, catalog.sections);
        assert_eq!(loaded.machine_types, catalog.machine_types);
    }
}
