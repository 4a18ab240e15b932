//! Health gate.
//!
//! A machine may not be started while its health state is BREAKDOWN or
//! REMOVED. Health corrections themselves are always allowed - fixing the
//! health state is how an operator clears the block - and IDLE is always
//! reachable regardless of health.

use floortrack_protocol::{ActivityStatus, HealthStatus};

/// Check a requested activity transition against the current health state.
///
/// Returns the blocking health state when the machine is unserviceable.
pub fn check_activity(
    current: HealthStatus,
    requested: ActivityStatus,
) -> Result<(), HealthStatus> {
    if requested == ActivityStatus::Running && !current.is_serviceable() {
        return Err(current);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_blocked_while_down() {
        assert_eq!(
            check_activity(HealthStatus::Breakdown, ActivityStatus::Running),
            Err(HealthStatus::Breakdown)
        );
        assert_eq!(
            check_activity(HealthStatus::Removed, ActivityStatus::Running),
            Err(HealthStatus::Removed)
        );
    }

    #[test]
    fn test_running_allowed_while_serviceable() {
        assert!(check_activity(HealthStatus::Working, ActivityStatus::Running).is_ok());
        assert!(check_activity(HealthStatus::HalfWorking, ActivityStatus::Running).is_ok());
    }

    #[test]
    fn test_idle_always_allowed() {
        for health in [
            HealthStatus::Working,
            HealthStatus::HalfWorking,
            HealthStatus::Breakdown,
            HealthStatus::Removed,
        ] {
            assert!(check_activity(health, ActivityStatus::Idle).is_ok());
            assert!(check_activity(health, ActivityStatus::NotWorking).is_ok());
        }
    }
}
