//! Hand-authored coordinate tables for named bot templates.
//!
//! Some shipped templates look better with curated positions than with the
//! generic algorithm, so a matching template name bypasses layout entirely.

/// Curated coordinates for the "VProgulke" dating-bot template, keyed by
/// node id.
const VPROGULKE: &[(&str, f64, f64)] = &[
    ("start", 400.0, 50.0),
    ("welcome_message", 400.0, 250.0),
    ("main_menu", 400.0, 480.0),
    ("about_project", 60.0, 730.0),
    ("fill_profile", 400.0, 730.0),
    ("browse_profiles", 740.0, 730.0),
    ("profile_name_input", 400.0, 960.0),
    ("profile_age_input", 400.0, 1190.0),
    ("profile_photo_input", 400.0, 1420.0),
    ("profile_saved", 400.0, 1650.0),
    ("next_profile", 740.0, 960.0),
    ("skip_profile", 580.0, 1190.0),
    ("like_profile", 900.0, 1190.0),
    ("match_message", 900.0, 1420.0),
];

/// Returns the curated table for a template name, if one exists. Matching is
/// case-insensitive.
pub(super) fn preset_positions(template: &str) -> Option<&'static [(&'static str, f64, f64)]> {
    match template.to_ascii_lowercase().as_str() {
        "vprogulke" => Some(VPROGULKE),
        _ => None,
    }
}
