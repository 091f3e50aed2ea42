//! JSON export and import of the layer list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::store::LayerStore;
use crate::types::{CustomizationLayer, LayerError, LayerState};

/// Exported layer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerExport {
    pub layers: Vec<CustomizationLayer>,
    pub active_layer_id: Option<Uuid>,
    pub exported_at: DateTime<Utc>,
}

impl LayerStore {
    /// Pretty-printed `{layers, activeLayerId, exportedAt}`.
    pub fn export_layers(&self) -> Result<String, LayerError> {
        let export = LayerExport {
            layers: self.layers().to_vec(),
            active_layer_id: self.active_layer_id(),
            exported_at: Utc::now(),
        };
        serde_json::to_string_pretty(&export).map_err(|e| LayerError::Serialize {
            reason: e.to_string(),
        })
    }

    /// Replace the store with an exported payload.
    ///
    /// Ids are kept. On any error the store is left untouched.
    pub fn import_layers(&mut self, json: &str) -> Result<(), LayerError> {
        let state = parse_layer_export(json)
            .inspect_err(|e| warn!(error = %e, "layer import rejected"))?;
        info!(count = state.layers.len(), "importing layers");
        self.replace_state(state);
        Ok(())
    }
}

fn parse_layer_export(json: &str) -> Result<LayerState, LayerError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| LayerError::Import {
        reason: e.to_string(),
    })?;

    let raw_layers = value
        .get("layers")
        .filter(|v| v.is_array())
        .cloned()
        .ok_or_else(|| LayerError::Import {
            reason: "missing layers array".to_string(),
        })?;
    let layers: Vec<CustomizationLayer> =
        serde_json::from_value(raw_layers).map_err(|e| LayerError::Import {
            reason: e.to_string(),
        })?;

    let active_layer_id = value
        .get("activeLayerId")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok());

    Ok(LayerState {
        layers,
        active_layer_id,
    })
}
