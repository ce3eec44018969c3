//! Deterministic first-name → salutation heuristic
//!
//! Fixed lookup table of known first names; unknown names fall back to "Mr.".
//! The table contents and the fallback are fixed product policy, kept here in
//! one place.

pub const MR: &str = "Mr.";
pub const MS: &str = "Ms.";

/// Known first names and their salutation.
const KNOWN_NAMES: &[(&str, &str)] = &[
    ("anna", MS),
    ("claire", MS),
    ("elena", MS),
    ("emma", MS),
    ("james", MR),
    ("john", MR),
    ("julia", MS),
    ("laura", MS),
    ("maria", MS),
    ("michael", MR),
    ("peter", MR),
    ("sarah", MS),
    ("sophie", MS),
    ("thomas", MR),
    ("william", MR),
];

/// Guess a salutation for a first name. Blank input produces no guess;
/// any non-blank name always produces one ("Mr." when unknown).
pub fn guess_salutation(first_name: &str) -> Option<&'static str> {
    let normalized = first_name.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    Some(
        KNOWN_NAMES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, salutation)| *salutation)
            .unwrap_or(MR),
    )
}
