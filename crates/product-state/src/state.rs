use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use studio_types::{CustomizationSnapshot, Material};

use crate::config::ModelConfig;
use crate::family::ProductFamily;

/// Configuration and live customization of the product on display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductState {
    pub product_id: String,
    pub model_path: String,
    pub family: ProductFamily,
    pub scale: [f64; 3],
    pub camera_distance: f64,
    pub camera_y: f64,
    pub model_height: f64,
    #[serde(rename = "customizationState")]
    pub customization: CustomizationSnapshot,
    /// Original material per mesh name, captured once per session.
    #[serde(skip)]
    pub material_snapshot: HashMap<String, Material>,
    pub timestamp: DateTime<Utc>,
}

impl ProductState {
    pub(crate) fn fresh(product_id: &str, model_path: &str, config: ModelConfig) -> Self {
        Self {
            product_id: product_id.to_string(),
            model_path: model_path.to_string(),
            family: ProductFamily::from_model_path(model_path),
            scale: config.scale_vec(),
            camera_distance: config.camera_distance,
            camera_y: config.camera_y,
            model_height: config.model_height,
            customization: CustomizationSnapshot::default(),
            material_snapshot: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.timestamp = Utc::now();
    }
}

/// Initial scale and camera distance of a model, before full initialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefaults {
    pub scale: [f64; 3],
    pub camera_distance: f64,
}

/// Errors from the product state store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProductError {
    #[error("no active product")]
    NoActiveProduct,

    #[error("product {product_id} has no model path")]
    MissingModelPath { product_id: String },
}
