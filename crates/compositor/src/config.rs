use serde::{Deserialize, Serialize};

/// Compositing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositorConfig {
    /// Scale used when a textured layer has none.
    pub default_layer_scale: f64,
    /// Floor applied to pattern scale before inverting it into a repeat.
    pub min_artwork_scale: f64,
    /// Floor applied to logo scale.
    pub min_logo_scale: f64,
    /// Logo repeats are clamped to 1.0 only above this scale.
    pub logo_clamp_threshold: f64,
    /// Texture offset per unit of layer position.
    pub offset_sensitivity: f64,
    pub texture_center: [f64; 2],
    /// Forward z-offset of logo overlays.
    pub logo_depth_offset: f64,
    pub logo_alpha_test: f64,
    pub max_anisotropy: u8,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            default_layer_scale: 0.3,
            min_artwork_scale: 0.05,
            min_logo_scale: 0.01,
            logo_clamp_threshold: 0.5,
            offset_sensitivity: 0.1,
            texture_center: [0.5, 0.5],
            logo_depth_offset: 0.001,
            logo_alpha_test: 0.1,
            max_anisotropy: 16,
        }
    }
}
