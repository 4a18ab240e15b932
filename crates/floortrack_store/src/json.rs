//! JSON-file machine registry.
//!
//! The registry is one JSON object keyed by machine id. Each operation
//! re-reads the file, mutates one record, and rewrites the file via a
//! temp-file rename. A process-local mutex serializes writers; cross-process
//! concurrency stays last-write-wins by design.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use floortrack_protocol::Machine;
use tracing::debug;

use crate::store::{MachinePatch, MachineStore, StoreError};

pub struct JsonMachineStore {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl JsonMachineStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Machine>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            source: err,
        })
    }

    fn save(&self, machines: &BTreeMap<String, Machine>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(machines).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            source: err,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let write = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, &self.path));
        write.map_err(|err| StoreError::Write {
            path: self.path.clone(),
            source: err,
        })
    }
}

impl MachineStore for JsonMachineStore {
    fn list(&self) -> Result<Vec<Machine>, StoreError> {
        Ok(self.load()?.into_values().collect())
    }

    fn get(&self, id: &str) -> Result<Option<Machine>, StoreError> {
        Ok(self.load()?.remove(id))
    }

    fn insert(&self, machine: &Machine) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock().expect("registry write lock");
        let mut machines = self.load()?;
        if machines.contains_key(&machine.id) {
            return Err(StoreError::AlreadyExists(machine.id.clone()));
        }
        machines.insert(machine.id.clone(), machine.clone());
        self.save(&machines)?;
        debug!(machine = %machine.id, "registered machine");
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_guard.lock().expect("registry write lock");
        let mut machines = self.load()?;
        let existed = machines.remove(id).is_some();
        if existed {
            self.save(&machines)?;
        }
        Ok(existed)
    }

    fn update(&self, id: &str, patch: &MachinePatch) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock().expect("registry write lock");
        let mut machines = self.load()?;
        let machine = machines
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(machine);
        self.save(&machines)?;
        debug!(machine = %id, "replaced machine record");
        Ok(())
    }
}
