//! Canonical class-name normalization.
//!
//! Gyms publish the same class under inconsistent titles ("BODYPUMP 45 with
//! Jane", "Bodypump - Studio 2"). An ordered substring rule list maps raw
//! titles onto a canonical token so names filter consistently across gyms.

/// Ordered, mutually exclusive substring rules. The first match wins.
const RULES: &[(&str, &str)] = &[
    ("RPM", "RPM"),
    ("GRIT STRENGTH", "GRIT STRENGTH"),
    ("GRIT CARDIO", "GRIT CARDIO"),
    ("BODYPUMP", "BODYPUMP"),
    ("BODYBALANCE", "BODYBALANCE"),
    ("BODYATTACK", "BODYATTACK"),
    ("CXWORX", "CXWORX"),
    ("SH'BAM", "SH'BAM"),
    ("BODYCOMBAT", "BODYCOMBAT"),
    ("YOGA", "YOGA"),
    ("GRIT PLYO", "GRIT PLYO"),
    ("BODYJAM", "BODYJAM"),
    ("SPRINT", "SPRINT"),
    ("BODYVIVE", "BODYVIVE"),
    ("BODYSTEP", "BODYSTEP"),
    ("BORN TO MOVE", "BORN TO MOVE"),
];

/// Map a raw feed title to its canonical class name.
///
/// Matching is case-insensitive; unrecognized titles pass through unchanged.
pub fn normalize(raw: &str) -> &str {
    let upper = raw.to_uppercase();
    RULES
        .iter()
        .find(|(pattern, _)| upper.contains(pattern))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(raw)
}
