use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Opaque handle to a renderer-native texture owned by the host.
pub type TextureId = u64;

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    Linear,
    LinearMipmapLinear,
}

/// Sampler state applied to a texture binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplerConfig {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub mag_filter: Filter,
    pub min_filter: Filter,
    pub anisotropy: u8,
    pub generate_mipmaps: bool,
    pub flip_y: bool,
}

impl SamplerConfig {
    /// High-quality sampler with the given wrap on both axes.
    pub fn with_wrap(wrap: WrapMode, anisotropy: u8) -> Self {
        Self {
            wrap_s: wrap,
            wrap_t: wrap,
            mag_filter: Filter::Linear,
            min_filter: Filter::LinearMipmapLinear,
            anisotropy,
            generate_mipmaps: true,
            flip_y: false,
        }
    }

    pub fn repeating(anisotropy: u8) -> Self {
        Self::with_wrap(WrapMode::Repeat, anisotropy)
    }

    pub fn clamped(anisotropy: u8) -> Self {
        Self::with_wrap(WrapMode::ClampToEdge, anisotropy)
    }
}

/// UV transform of a texture binding (repeat, offset, rotation center).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureTransform {
    pub repeat: [f64; 2],
    pub offset: [f64; 2],
    pub center: [f64; 2],
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            repeat: [1.0, 1.0],
            offset: [0.0, 0.0],
            center: [0.0, 0.0],
        }
    }
}

/// A texture bound into one material slot.
///
/// Each binding is its own copy: sampler and transform never leak between
/// slots or meshes that share the same underlying texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureBinding {
    pub texture: TextureId,
    pub url: String,
    /// Source image size in pixels (width, height).
    pub size: [u32; 2],
    pub sampler: SamplerConfig,
    pub transform: TextureTransform,
}

/// Shading model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShadingModel {
    /// Metal/roughness PBR.
    Standard,
    /// Standard plus clearcoat, reflectivity and index of refraction.
    Physical,
}

/// Extra parameters carried by [`ShadingModel::Physical`] materials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalParams {
    pub clearcoat: f64,
    pub clearcoat_roughness: f64,
    pub reflectivity: f64,
    pub ior: f64,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            reflectivity: 0.5,
            ior: 1.5,
        }
    }
}

/// Renderer-neutral description of a mesh material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub model: ShadingModel,
    pub color: Rgb,
    pub map: Option<TextureBinding>,
    pub normal_map: Option<TextureBinding>,
    pub normal_scale: [f64; 2],
    pub roughness_map: Option<TextureBinding>,
    pub metalness_map: Option<TextureBinding>,
    pub ao_map: Option<TextureBinding>,
    pub ao_map_intensity: f64,
    pub emissive: Rgb,
    pub emissive_map: Option<TextureBinding>,
    pub emissive_intensity: f64,
    pub roughness: f64,
    pub metalness: f64,
    pub env_map_intensity: f64,
    pub transparent: bool,
    pub opacity: f64,
    pub alpha_test: f64,
    pub depth_write: bool,
    pub double_sided: bool,
    /// Present iff `model` is `Physical`.
    pub physical: Option<PhysicalParams>,
}

impl Default for Material {
    fn default() -> Self {
        Self::standard()
    }
}

impl Material {
    /// A white standard material with renderer defaults.
    pub fn standard() -> Self {
        Self {
            model: ShadingModel::Standard,
            color: Rgb::WHITE,
            map: None,
            normal_map: None,
            normal_scale: [1.0, 1.0],
            roughness_map: None,
            metalness_map: None,
            ao_map: None,
            ao_map_intensity: 1.0,
            emissive: Rgb::BLACK,
            emissive_map: None,
            emissive_intensity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            env_map_intensity: 1.0,
            transparent: false,
            opacity: 1.0,
            alpha_test: 0.0,
            depth_write: true,
            double_sided: false,
            physical: None,
        }
    }

    /// Build a fresh physical material seeded from this one.
    ///
    /// Only color, diffuse map, normal map, roughness and metalness carry
    /// over; everything else starts from defaults.
    pub fn to_physical(&self) -> Self {
        Self {
            model: ShadingModel::Physical,
            color: self.color,
            map: self.map.clone(),
            normal_map: self.normal_map.clone(),
            roughness: self.roughness,
            metalness: self.metalness,
            env_map_intensity: 1.0,
            physical: Some(PhysicalParams::default()),
            ..Self::standard()
        }
    }

    pub fn is_physical(&self) -> bool {
        self.model == ShadingModel::Physical
    }

    /// Every texture binding currently held by the material.
    pub fn bindings(&self) -> impl Iterator<Item = &TextureBinding> {
        [
            &self.map,
            &self.normal_map,
            &self.roughness_map,
            &self.metalness_map,
            &self.ao_map,
            &self.emissive_map,
        ]
        .into_iter()
        .flatten()
    }
}
