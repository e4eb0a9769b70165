//! Exercise name canonicalization.
//!
//! Historical entries used several spellings for the same exercise
//! ("Pulldown Lat", "RDLs", "Russian Twists", ...). Everything that is stored
//! or aggregated goes through [`canonicalize`] first so those variants land on
//! one display name.

/// Lookup keys are trimmed and lower-cased. No canonical value lower-cases to
/// a key that maps to a different value, which keeps canonicalization idempotent.
const CANONICAL_NAMES: &[(&str, &str)] = &[
    ("pulldown", "Lat Pulldown"),
    ("pulldown lat", "Lat Pulldown"),
    ("pulldown beneden", "Lat Pulldown"),
    ("lat pulldown", "Lat Pulldown"),
    ("flys", "Pec Flyes"),
    ("pec flys", "Pec Flyes"),
    ("row cable", "Cable Row"),
    ("cable row", "Cable Row"),
    ("rdl", "Back Extension"),
    ("rdls", "Back Extension"),
    ("romanian deadlift", "Back Extension"),
    ("romanian deadlifts", "Back Extension"),
    ("russian twist", "Torso Rotation"),
    ("russian twists", "Torso Rotation"),
    ("squats/legpress", "Legpress"),
    ("lat raises cable", "Lateral Raises Cable"),
];

/// Map a raw exercise name to its canonical display name.
///
/// Unknown names come back exactly as given, untrimmed and with their casing.
pub fn canonicalize(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    CANONICAL_NAMES
        .iter()
        .find(|(variant, _)| *variant == key)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Canonical names in request order with duplicates removed.
pub fn canonicalize_all<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let canonical = canonicalize(name.as_ref());
        if !names.contains(&canonical) {
            names.push(canonical);
        }
    }
    names
}
