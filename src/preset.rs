use serde::{Deserialize, Serialize};

/// A named, fixed countdown duration offered to the user.
///
/// The set of presets is closed: it is supplied once at startup and the
/// engine only ever switches between members of that list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationPreset {
    pub label: String,
    pub total_seconds: u32,
}

impl DurationPreset {
    pub fn new(label: impl Into<String>, total_seconds: u32) -> Self {
        Self {
            label: label.into(),
            total_seconds,
        }
    }
}

/// The preset table offered by the reference UI.
pub fn default_presets() -> Vec<DurationPreset> {
    vec![
        DurationPreset::new("5 min", 5 * 60),
        DurationPreset::new("15 min", 15 * 60),
        DurationPreset::new("45 min", 45 * 60),
        DurationPreset::new("1 hr", 60 * 60),
        DurationPreset::new("4 hr", 4 * 60 * 60),
        DurationPreset::new("24 hr", 24 * 60 * 60),
    ]
}
