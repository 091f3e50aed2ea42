use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Presentation values for one model file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Uniform scale applied on all three axes.
    pub scale: f64,
    pub camera_distance: f64,
    pub camera_y: f64,
    pub model_height: f64,
}

impl ModelConfig {
    pub const fn new(scale: f64, camera_distance: f64, camera_y: f64, model_height: f64) -> Self {
        Self {
            scale,
            camera_distance,
            camera_y,
            model_height,
        }
    }

    pub fn scale_vec(&self) -> [f64; 3] {
        [self.scale; 3]
    }
}

/// Fallback for model files not in the table.
pub const DEFAULT_MODEL_CONFIG: ModelConfig = ModelConfig::new(5.25, 4.0, 0.0, 0.2);

/// Lookup the scale and camera values of a model by file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfigTable {
    pub entries: HashMap<String, ModelConfig>,
    pub default: ModelConfig,
}

impl ModelConfigTable {
    /// The studio's shipped model table.
    pub fn builtin() -> Self {
        let glass = ModelConfig::new(1.0, 4.0, 0.0, 0.2);
        let entries = [
            ("glassjar.glb", glass),
            ("glassjar1.glb", glass),
            ("glassjar2.glb", glass),
            ("glassjar3.glb", glass),
            ("jar.glb", ModelConfig::new(5.0, 4.0, 0.0, 0.2)),
            ("blkjar.glb", ModelConfig::new(8.4, 4.0, 0.0, 0.2)),
            ("pouch.glb", ModelConfig::new(2.0, 40.0, 0.0, -1.5)),
        ]
        .into_iter()
        .map(|(file, config)| (file.to_string(), config))
        .collect();

        Self {
            entries,
            default: DEFAULT_MODEL_CONFIG,
        }
    }

    /// Resolve a model path (URL or file path) to its configuration.
    pub fn lookup(&self, model_path: &str) -> ModelConfig {
        self.entries
            .get(model_file_name(model_path))
            .copied()
            .unwrap_or(self.default)
    }

    pub fn contains(&self, model_path: &str) -> bool {
        self.entries.contains_key(model_file_name(model_path))
    }
}

impl Default for ModelConfigTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Last `/` segment of a path with any `?query` removed.
pub fn model_file_name(model_path: &str) -> &str {
    let file = model_path.rsplit('/').next().unwrap_or(model_path);
    file.split('?').next().unwrap_or(file)
}
