//! PBR material library and channel construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use studio_types::{Material, TargetPart, TextureBinding, TextureTransform};

use crate::texture::{TextureCache, TextureError, TextureLoader, TextureRole};

/// A material set file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMaterialSet {
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub materials: Vec<PbrMaterial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMaterial {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub maps: PbrMaps,
    pub properties: PbrProperties,
    #[serde(default)]
    pub tiling: Tiling,
    /// Region tags, or `all`.
    #[serde(default)]
    pub target_parts: Vec<String>,
}

impl PbrMaterial {
    pub fn supports_part(&self, part: TargetPart) -> bool {
        self.target_parts
            .iter()
            .any(|p| p == part.as_str() || p == TargetPart::All.as_str())
    }
}

/// Texture URLs per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMaps {
    pub diffuse: Option<String>,
    pub normal: Option<String>,
    pub roughness: Option<String>,
    pub metallic: Option<String>,
    /// Listed for completeness; never bound.
    pub displacement: Option<String>,
    pub ao: Option<String>,
    pub emission: Option<String>,
}

impl PbrMaps {
    /// Every URL that is bound onto a material (displacement excluded).
    pub fn bound_urls(&self) -> impl Iterator<Item = &str> {
        [
            &self.diffuse,
            &self.normal,
            &self.roughness,
            &self.metallic,
            &self.ao,
            &self.emission,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrProperties {
    pub roughness: f64,
    pub metallic: f64,
    #[serde(default)]
    pub transparency: f64,
    #[serde(default)]
    pub displacement_scale: Option<f64>,
    #[serde(default)]
    pub normal_scale: Option<f64>,
    #[serde(default)]
    pub emissive_intensity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tiling {
    pub repeat_u: f64,
    pub repeat_v: f64,
}

impl Default for Tiling {
    fn default() -> Self {
        Self {
            repeat_u: 1.0,
            repeat_v: 1.0,
        }
    }
}

/// Channels copied from a resolved PBR material onto a working material.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrChannels {
    pub map: Option<TextureBinding>,
    pub normal_map: Option<TextureBinding>,
    pub normal_scale: [f64; 2],
    pub roughness_map: Option<TextureBinding>,
    pub metalness_map: Option<TextureBinding>,
    pub ao_map: Option<TextureBinding>,
    pub ao_map_intensity: f64,
    pub emissive_map: Option<TextureBinding>,
    pub emissive_intensity: f64,
    pub roughness: f64,
    pub metalness: f64,
    pub transparent: bool,
    pub opacity: f64,
}

impl PbrChannels {
    /// Copy present maps and the scalar properties; absent maps leave the
    /// target's slot alone.
    pub fn apply_to(&self, material: &mut Material) {
        if let Some(map) = &self.map {
            material.map = Some(map.clone());
        }
        if let Some(normal) = &self.normal_map {
            material.normal_map = Some(normal.clone());
            material.normal_scale = self.normal_scale;
        }
        if let Some(roughness) = &self.roughness_map {
            material.roughness_map = Some(roughness.clone());
        }
        if let Some(metalness) = &self.metalness_map {
            material.metalness_map = Some(metalness.clone());
        }
        if let Some(ao) = &self.ao_map {
            material.ao_map = Some(ao.clone());
            material.ao_map_intensity = self.ao_map_intensity;
        }
        if let Some(emissive) = &self.emissive_map {
            material.emissive_map = Some(emissive.clone());
            material.emissive_intensity = self.emissive_intensity;
        }
        material.roughness = self.roughness;
        material.metalness = self.metalness;
        material.transparent = self.transparent;
        material.opacity = self.opacity;
    }
}

/// Errors from the PBR library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PbrError {
    #[error("pbr material not found: {id}")]
    UnknownMaterial { id: String },

    #[error("invalid material set: {reason}")]
    MaterialSet { reason: String },

    #[error("pbr material {id}: {source}")]
    TextureFailed {
        id: String,
        #[source]
        source: TextureError,
    },
}

/// Registered PBR materials, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PbrLibrary {
    materials: BTreeMap<String, PbrMaterial>,
}

impl PbrLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every material of a set file. Later ids replace earlier ones.
    pub fn load_material_set(&mut self, json: &str) -> Result<usize, PbrError> {
        let set: PbrMaterialSet = serde_json::from_str(json).map_err(|e| PbrError::MaterialSet {
            reason: e.to_string(),
        })?;
        let count = set.materials.len();
        for material in set.materials {
            self.materials.insert(material.id.clone(), material);
        }
        info!(count, version = %set.version, "loaded pbr material set");
        Ok(count)
    }

    pub fn insert(&mut self, material: PbrMaterial) {
        self.materials.insert(material.id.clone(), material);
    }

    pub fn get(&self, id: &str) -> Option<&PbrMaterial> {
        self.materials.get(id)
    }

    pub fn all(&self) -> Vec<&PbrMaterial> {
        self.materials.values().collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&PbrMaterial> {
        self.materials
            .values()
            .filter(|m| m.category == category)
            .collect()
    }

    pub fn for_part(&self, part: TargetPart) -> Vec<&PbrMaterial> {
        self.materials
            .values()
            .filter(|m| m.supports_part(part))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Build channels for `id` from the texture cache.
    ///
    /// Requests any missing map. `Ok(None)` while a map is still loading.
    pub fn resolve(
        &self,
        id: &str,
        textures: &mut TextureCache,
        loader: &mut dyn TextureLoader,
        anisotropy: u8,
    ) -> Result<Option<PbrChannels>, PbrError> {
        let material = self
            .get(id)
            .ok_or_else(|| PbrError::UnknownMaterial { id: id.to_string() })?;
        let transform = TextureTransform {
            repeat: [material.tiling.repeat_u, material.tiling.repeat_v],
            ..TextureTransform::default()
        };

        // Every map is requested before the first failure is reported.
        let mut pending = false;
        let mut bind = |url: &Option<String>| -> Result<Option<TextureBinding>, PbrError> {
            let Some(url) = url else {
                return Ok(None);
            };
            match textures.ensure(url, loader) {
                Ok(Some(info)) => Ok(Some(info.bind(
                    url,
                    TextureRole::Pattern,
                    anisotropy,
                    transform,
                ))),
                Ok(None) => {
                    pending = true;
                    Ok(None)
                }
                Err(source) => Err(PbrError::TextureFailed {
                    id: id.to_string(),
                    source,
                }),
            }
        };

        let maps = &material.maps;
        let map = bind(&maps.diffuse);
        let normal_map = bind(&maps.normal);
        let roughness_map = bind(&maps.roughness);
        let metalness_map = bind(&maps.metallic);
        let ao_map = bind(&maps.ao);
        let emissive_map = bind(&maps.emission);
        let (map, normal_map, roughness_map, metalness_map, ao_map, emissive_map) = (
            map?,
            normal_map?,
            roughness_map?,
            metalness_map?,
            ao_map?,
            emissive_map?,
        );

        if pending {
            debug!(id, "pbr material waiting on textures");
            return Ok(None);
        }

        let props = &material.properties;
        let normal_scale = props.normal_scale.unwrap_or(1.0);
        Ok(Some(PbrChannels {
            map,
            normal_map,
            normal_scale: [normal_scale, normal_scale],
            roughness_map,
            metalness_map,
            ao_map,
            ao_map_intensity: 1.0,
            emissive_map,
            emissive_intensity: props.emissive_intensity.unwrap_or(1.0),
            roughness: props.roughness,
            metalness: props.metallic,
            transparent: props.transparency > 0.0,
            opacity: 1.0 - props.transparency,
        }))
    }
}
