//! Identifier normalization and machine-id generation.
//!
//! Machine ids are the scannable payload, format `SECTION-TYPE-NNN`. All
//! matching is done on normalized (upper-cased, separator-free) forms so a
//! label scanned as "cut laser 1" still finds `CUT-LASER-001`.

use crate::types::Machine;

/// Upper-case and trim a raw scanned/typed identifier.
pub fn normalize_ident(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Remove whitespace and hyphens for fuzzy comparison.
pub fn strip_separators(s: &str) -> String {
    s.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect()
}

/// Canonical section/type token: trimmed, upper-cased, internal whitespace
/// removed (so "Laser Cut" becomes "LASERCUT").
pub fn id_token(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect()
}

/// Generate the next machine id for a section/type pair.
///
/// Counter is one past the number of machines already registered under the
/// same pair, zero-padded to three digits.
pub fn next_machine_id(section: &str, machine_type: &str, registry: &[Machine]) -> String {
    let section = id_token(section);
    let machine_type = id_token(machine_type);
    let count = registry
        .iter()
        .filter(|m| id_token(&m.section) == section && id_token(&m.machine_type) == machine_type)
        .count();
    format!("{}-{}-{:03}", section, machine_type, count + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_normalize_ident() {
        assert_eq!(normalize_ident("  cut-laser-001 "), "CUT-LASER-001");
        assert_eq!(normalize_ident(""), "");
    }

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators("CUT-LASER-001"), "CUTLASER001");
        assert_eq!(strip_separators("Aurora 001"), "Aurora001");
    }

    #[test]
    fn test_next_machine_id_counts_per_pair() {
        let now = Utc::now();
        let registry = vec![
            Machine::new("CUT-LASER-001", "CUT", "LASER", "Laser 1", now),
            Machine::new("CUT-LASER-002", "CUT", "LASER", "Laser 2", now),
            Machine::new("SEW-JUKI-001", "SEW", "JUKI", "Juki 1", now),
        ];
        assert_eq!(next_machine_id("CUT", "LASER", &registry), "CUT-LASER-003");
        assert_eq!(next_machine_id("SEW", "JUKI", &registry), "SEW-JUKI-002");
        assert_eq!(next_machine_id("PRESS", "HYD", &registry), "PRESS-HYD-001");
    }

    #[test]
    fn test_next_machine_id_sanitizes_tokens() {
        assert_eq!(next_machine_id(" cut ", "laser cut", &[]), "CUT-LASERCUT-001");
    }
}
