use serde::{Deserialize, Serialize};

use crate::region::TargetPart;

pub const DEFAULT_SELECTED_COLOR: &str = "#ff4444";
pub const DEFAULT_REFLECTIVENESS: f64 = 0.5;

/// Live, not-yet-committed customization selection of the current product.
///
/// Fields missing on read take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationSnapshot {
    pub selected_color: String,
    /// Gates the preview color: only an explicit pick this session paints.
    pub has_color_changed: bool,
    /// Preview texture URL; empty when nothing is pending.
    pub selected_artwork: String,
    pub target_part: TargetPart,
    /// Global glossiness in [0, 1].
    pub reflectiveness: f64,
}

impl Default for CustomizationSnapshot {
    fn default() -> Self {
        Self {
            selected_color: DEFAULT_SELECTED_COLOR.to_string(),
            has_color_changed: false,
            selected_artwork: String::new(),
            target_part: TargetPart::All,
            reflectiveness: DEFAULT_REFLECTIVENESS,
        }
    }
}

impl CustomizationSnapshot {
    /// The preview texture URL, if one is pending.
    pub fn preview_artwork(&self) -> Option<&str> {
        if self.selected_artwork.is_empty() {
            None
        } else {
            Some(&self.selected_artwork)
        }
    }

    /// Merge every `Some` field of `update`; `None` fields are left alone.
    pub fn apply(&mut self, update: &CustomizationUpdate) {
        if let Some(color) = &update.selected_color {
            self.selected_color = color.clone();
        }
        if let Some(changed) = update.has_color_changed {
            self.has_color_changed = changed;
        }
        if let Some(artwork) = &update.selected_artwork {
            self.selected_artwork = artwork.clone();
        }
        if let Some(part) = update.target_part {
            self.target_part = part;
        }
        if let Some(r) = update.reflectiveness {
            self.reflectiveness = r.clamp(0.0, 1.0);
        }
    }
}

/// Partial update of a [`CustomizationSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_color_changed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_artwork: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_part: Option<TargetPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectiveness: Option<f64>,
}

impl From<CustomizationSnapshot> for CustomizationUpdate {
    fn from(snapshot: CustomizationSnapshot) -> Self {
        Self {
            selected_color: Some(snapshot.selected_color),
            has_color_changed: Some(snapshot.has_color_changed),
            selected_artwork: Some(snapshot.selected_artwork),
            target_part: Some(snapshot.target_part),
            reflectiveness: Some(snapshot.reflectiveness),
        }
    }
}
