use serde::{Deserialize, Serialize};

/// What a customization layer paints onto its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// `value` is a hex color.
    Color,
    /// `value` is an image URL (pattern or logo).
    Artwork,
    /// `value` is the diffuse URL of a material; `materialId` names the set.
    Material,
}

impl LayerKind {
    /// Kinds whose position/scale drive a texture transform.
    pub fn is_textured(&self) -> bool {
        matches!(self, LayerKind::Artwork | LayerKind::Material)
    }
}

/// How a material layer binds its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Pbr,
    Simple,
}

/// Texture-space placement of an artwork layer. Only `x`/`y` are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
