use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use studio_types::{LayerKind, MaterialType, Position, TargetPart};

/// Reflectiveness given to new artwork and material layers.
pub const DEFAULT_LAYER_REFLECTIVENESS: f64 = 0.5;

/// A single user-authored customization intent bound to a target part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationLayer {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub target_part: TargetPart,
    /// Hex color for color layers, image URL otherwise.
    pub value: String,
    pub is_visible: bool,
    /// Dense compositing index, 0-based.
    pub order: usize,
    /// Exports without a timestamp take the import time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
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

impl CustomizationLayer {
    /// Artwork layers whose name mentions "logo" become overlays.
    pub fn is_logo(&self) -> bool {
        self.kind == LayerKind::Artwork && self.name.to_lowercase().contains("logo")
    }

    /// Material layers bound to a PBR material set entry.
    pub fn pbr_material_id(&self) -> Option<&str> {
        match (self.kind, self.material_type, &self.material_id) {
            (LayerKind::Material, Some(MaterialType::Pbr), Some(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Position, defaulting to the origin.
    pub fn position_or_origin(&self) -> Position {
        self.position.unwrap_or(Position::ORIGIN)
    }
}

/// Optional attributes supplied at layer creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerOptions {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub material_type: Option<MaterialType>,
    #[serde(default)]
    pub reflectiveness: Option<f64>,
}

/// Partial update of a layer. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_part: Option<TargetPart>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub material_type: Option<MaterialType>,
    #[serde(default)]
    pub reflectiveness: Option<f64>,
}

impl LayerUpdate {
    pub(crate) fn apply_to(&self, layer: &mut CustomizationLayer) {
        if let Some(name) = &self.name {
            layer.name = name.clone();
        }
        if let Some(part) = self.target_part {
            layer.target_part = part;
        }
        if let Some(value) = &self.value {
            layer.value = value.clone();
        }
        if let Some(visible) = self.is_visible {
            layer.is_visible = visible;
        }
        if let Some(position) = self.position {
            layer.position = Some(position);
        }
        if let Some(scale) = self.scale {
            layer.scale = Some(scale);
        }
        if let Some(id) = &self.material_id {
            layer.material_id = Some(id.clone());
        }
        if let Some(kind) = self.material_type {
            layer.material_type = Some(kind);
        }
        if let Some(r) = self.reflectiveness {
            layer.reflectiveness = Some(r.clamp(0.0, 1.0));
        }
    }
}

/// The observable state of a [`crate::LayerStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerState {
    /// Sorted by `order`; `layers[i].order == i`.
    pub layers: Vec<CustomizationLayer>,
    pub active_layer_id: Option<Uuid>,
}

/// Errors from the layer store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayerError {
    #[error("layer not found: {id}")]
    NotFound { id: Uuid },

    #[error("invalid layer import: {reason}")]
    Import { reason: String },

    #[error("layer serialization failed: {reason}")]
    Serialize { reason: String },
}
