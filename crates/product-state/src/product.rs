use serde::{Deserialize, Serialize};

use crate::family::{FamilyCapabilities, ProductFamily};

/// A product the studio can display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub model_path: String,
    pub family: ProductFamily,
}

impl Product {
    /// Register a product, resolving its family from the model file.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        model_path: impl Into<String>,
    ) -> Self {
        let model_path = model_path.into();
        Self {
            id: id.into(),
            name: name.into(),
            family: ProductFamily::from_model_path(&model_path),
            model_path,
        }
    }

    pub fn capabilities(&self) -> FamilyCapabilities {
        self.family.capabilities()
    }
}
