//! Icon catalog for envelopes
//!
//! Icons are plain string slugs; the presentation layer decides how to
//! render them. The catalog backs picker UIs and the default for new
//! envelopes.

/// Default icon assigned when none is chosen
pub const DEFAULT_ICON: &str = "envelope";

/// All icons offered by the envelope picker
pub const ENVELOPE_ICONS: &[&str] = &[
    "envelope",
    "dollar",
    "cart",
    "house",
    "car",
    "heart",
    "gift",
    "dining",
    "fuel",
    "bag",
    "creditcard",
    "banknote",
    "star",
    "book",
    "game",
    "tv",
    "phone",
    "wifi",
    "bolt",
    "drop",
];

/// Check whether an icon slug is part of the standard catalog
pub fn is_known_icon(icon: &str) -> bool {
    ENVELOPE_ICONS.contains(&icon)
}
