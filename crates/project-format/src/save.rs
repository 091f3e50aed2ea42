use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use layer_engine::LayerState;
use product_state::{Product, ProductState};

use crate::model::{Project, ProjectLayer, ProjectLayerState, ProjectModelState, PROJECT_VERSION};

/// User-supplied fields of a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// A fresh `project_<uuid>` id.
pub fn new_project_id() -> String {
    format!("project_{}", Uuid::new_v4().simple())
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Snapshot the product, its model state and the layer stack into a project.
pub fn capture_project(
    id: String,
    request: &SaveRequest,
    product: &Product,
    state: &ProductState,
    layers: &LayerState,
    now_ms: i64,
) -> Project {
    Project {
        id,
        name: request.name.clone(),
        description: request.description.clone(),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        model_path: product.model_path.clone(),
        model_state: ProjectModelState {
            scale: Some(state.scale),
            camera_distance: Some(state.camera_distance),
            camera_y: Some(state.camera_y),
            model_height: Some(state.model_height),
            customization_state: state.customization.clone(),
        },
        layer_state: ProjectLayerState {
            layers: layers.layers.iter().map(ProjectLayer::from).collect(),
            active_layer_id: layers.active_layer_id.map(|id| id.to_string()),
        },
        created_at: now_ms,
        updated_at: now_ms,
        version: PROJECT_VERSION.to_string(),
        thumbnail: request.thumbnail.clone(),
    }
}
