//! The persisted project shape.
//!
//! Field names are camelCase and timestamps are epoch milliseconds so files
//! written by earlier studio builds load unchanged.

use serde::{Deserialize, Serialize};

use layer_engine::CustomizationLayer;
use studio_types::{CustomizationSnapshot, LayerKind, MaterialType, Position, TargetPart};

/// Format version written into every saved project.
pub const PROJECT_VERSION: &str = "1.0.0";

/// A saved studio session.
///
/// Only `id`, `name`, `modelState` and `layerState` are required on read;
/// everything else falls back to a default so older files still import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub model_path: String,
    pub model_state: ProjectModelState,
    pub layer_state: ProjectLayerState,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default = "current_version")]
    pub version: String,
    /// Data URL of a preview screenshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

fn current_version() -> String {
    PROJECT_VERSION.to_string()
}

/// Model presentation at save time. Values missing from a file leave the
/// product's own defaults in place when the project is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModelState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_height: Option<f64>,
    #[serde(default)]
    pub customization_state: CustomizationSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLayerState {
    #[serde(default)]
    pub layers: Vec<ProjectLayer>,
    #[serde(default)]
    pub active_layer_id: Option<String>,
}

/// A layer as stored in a project. Ids are kept as strings; they are
/// replaced when the project is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLayer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub value: String,
    pub target_part: TargetPart,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<MaterialType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectiveness: Option<f64>,
}

fn visible() -> bool {
    true
}

impl From<&CustomizationLayer> for ProjectLayer {
    fn from(layer: &CustomizationLayer) -> Self {
        Self {
            id: layer.id.to_string(),
            name: layer.name.clone(),
            kind: layer.kind,
            value: layer.value.clone(),
            target_part: layer.target_part,
            is_visible: layer.is_visible,
            order: layer.order,
            position: layer.position,
            scale: layer.scale,
            material_id: layer.material_id.clone(),
            material_type: layer.material_type,
            reflectiveness: layer.reflectiveness,
        }
    }
}

impl ProjectLayerState {
    /// Layers in compositing order.
    pub fn ordered(&self) -> Vec<&ProjectLayer> {
        let mut layers: Vec<&ProjectLayer> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.order);
        layers
    }
}

/// The listing view of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub product_name: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            product_name: project.product_name.clone(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            thumbnail: project.thumbnail.clone(),
        }
    }
}

/// Pretty JSON of a project plus the suggested download name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExport {
    pub file_name: String,
    pub json: String,
}

/// `<name lowercased, non-alphanumerics replaced by "_">_project.json`
pub fn export_file_name(project_name: &str) -> String {
    let stem: String = project_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}_project.json")
}
