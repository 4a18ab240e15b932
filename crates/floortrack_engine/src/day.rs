//! Start-of-day reset.

use chrono::{DateTime, Utc};
use floortrack_protocol::ActivityStatus;
use floortrack_store::{MachinePatch, MachineStore, StoreError};
use tracing::info;

/// Reset every machine for a new shift: NOT_WORKING machines stay
/// NOT_WORKING, everything else returns to IDLE, and all scan slots are
/// cleared. Bulk resets write no audit records.
///
/// Returns the number of machines touched.
pub fn start_day(store: &dyn MachineStore, now: DateTime<Utc>) -> Result<usize, StoreError> {
    let machines = store.list()?;
    for machine in &machines {
        let next = if machine.status == ActivityStatus::NotWorking {
            ActivityStatus::NotWorking
        } else {
            ActivityStatus::Idle
        };
        store.update(
            &machine.id,
            &MachinePatch::DayReset {
                status: next,
                last_updated: now,
            },
        )?;
    }
    info!(machines = machines.len(), "start-of-day reset complete");
    Ok(machines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use floortrack_protocol::Machine;
    use floortrack_store::MemoryMachineStore;

    #[test]
    fn test_start_day_resets_activity_and_slots() {
        let now = Utc::now();
        let mut running = Machine::new("CUT-LASER-001", "CUT", "LASER", "Laser 1", now);
        running.status = ActivityStatus::Running;
        let mut parked = Machine::new("SEW-JUKI-001", "SEW", "JUKI", "Juki 1", now);
        parked.status = ActivityStatus::NotWorking;

        let store = MemoryMachineStore::with_machines(vec![running, parked]);

        // give the running machine some history to clear
        let snapshot = store.get("CUT-LASER-001").unwrap().unwrap();
        let mut scans = snapshot.scans;
        crate::slots::record_activity(&mut scans, ActivityStatus::Running, "op1", now);
        store
            .update(
                "CUT-LASER-001",
                &MachinePatch::Activity {
                    status: ActivityStatus::Running,
                    scans,
                    last_updated: now,
                },
            )
            .unwrap();

        let later = now + Duration::hours(8);
        let touched = start_day(&store, later).unwrap();
        assert_eq!(touched, 2);

        let laser = store.get("CUT-LASER-001").unwrap().unwrap();
        assert_eq!(laser.status, ActivityStatus::Idle);
        assert!(laser.scans.is_empty());
        assert_eq!(laser.last_updated, later);

        // NOT_WORKING persists across the reset
        let juki = store.get("SEW-JUKI-001").unwrap().unwrap();
        assert_eq!(juki.status, ActivityStatus::NotWorking);
    }
}
