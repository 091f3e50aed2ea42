use serde::{Deserialize, Serialize};

use crate::config::model_file_name;

/// Product family, resolved once from the model file when a product is
/// registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductFamily {
    /// Flexible pouch with a printable label area.
    Pouch,
    /// Tinted glass jar (`blkjar`).
    BlackGlassJar,
    /// Clear glass jar (`glassjar*`).
    GlassJar,
    /// Child-resistant jar (`jar.glb`).
    ChildResistantJar,
    #[default]
    Generic,
}

/// What the compositor may do for a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyCapabilities {
    /// Physical material with clearcoat; enables the reflectiveness slider.
    pub clearcoat: bool,
    /// Base meshes are see-through tinted glass until artwork lands.
    pub tinted_glass_base: bool,
}

impl ProductFamily {
    pub fn from_model_path(model_path: &str) -> Self {
        let file = model_file_name(model_path).to_lowercase();
        if file.contains("pouch") {
            ProductFamily::Pouch
        } else if file.contains("blkjar") {
            ProductFamily::BlackGlassJar
        } else if file.starts_with("glassjar") {
            ProductFamily::GlassJar
        } else if file == "jar.glb" {
            ProductFamily::ChildResistantJar
        } else {
            ProductFamily::Generic
        }
    }

    pub fn capabilities(&self) -> FamilyCapabilities {
        match self {
            ProductFamily::Pouch => FamilyCapabilities {
                clearcoat: true,
                tinted_glass_base: false,
            },
            ProductFamily::BlackGlassJar => FamilyCapabilities {
                clearcoat: false,
                tinted_glass_base: true,
            },
            ProductFamily::GlassJar | ProductFamily::ChildResistantJar | ProductFamily::Generic => {
                FamilyCapabilities {
                    clearcoat: false,
                    tinted_glass_base: false,
                }
            }
        }
    }
}
