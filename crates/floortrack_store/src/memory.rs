//! In-memory machine registry, used by the engine tests and `memory:` URLs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use floortrack_protocol::Machine;

use crate::store::{MachinePatch, MachineStore, StoreError};

#[derive(Default)]
pub struct MemoryMachineStore {
    machines: Mutex<BTreeMap<String, Machine>>,
}

impl MemoryMachineStore {
    pub fn with_machines(machines: impl IntoIterator<Item = Machine>) -> Self {
        Self {
            machines: Mutex::new(
                machines
                    .into_iter()
                    .map(|m| (m.id.clone(), m))
                    .collect(),
            ),
        }
    }
}

impl MachineStore for MemoryMachineStore {
    fn list(&self) -> Result<Vec<Machine>, StoreError> {
        Ok(self
            .machines
            .lock()
            .expect("registry lock")
            .values()
            .cloned()
            .collect())
    }

    fn get(&self, id: &str) -> Result<Option<Machine>, StoreError> {
        Ok(self.machines.lock().expect("registry lock").get(id).cloned())
    }

    fn insert(&self, machine: &Machine) -> Result<(), StoreError> {
        let mut machines = self.machines.lock().expect("registry lock");
        if machines.contains_key(&machine.id) {
            return Err(StoreError::AlreadyExists(machine.id.clone()));
        }
        machines.insert(machine.id.clone(), machine.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .machines
            .lock()
            .expect("registry lock")
            .remove(id)
            .is_some())
    }

    fn update(&self, id: &str, patch: &MachinePatch) -> Result<(), StoreError> {
        let mut machines = self.machines.lock().expect("registry lock");
        let machine = machines
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(machine);
        Ok(())
    }
}
