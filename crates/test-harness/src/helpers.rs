//! Helper functions: error type, product fixtures, scene mesh builders.

use studio_bridge::SceneMesh;
use studio_types::{Material, Rgb};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("layer not found: {name}")]
    LayerNotFound { name: String },

    #[error("mesh not found: {name}")]
    MeshNotFound { name: String },

    #[error("dispatch error: {message}")]
    DispatchError { message: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("composition error on {mesh}: {message}")]
    Composition { mesh: String, message: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },
}

// ── Product Fixtures ────────────────────────────────────────────────────────

/// A product the page can offer: id, display name, model path and the
/// mesh names its model contains.
#[derive(Debug, Clone, Copy)]
pub struct ProductFixture {
    pub id: &'static str,
    pub name: &'static str,
    pub model_path: &'static str,
    pub meshes: &'static [&'static str],
}

pub const JAR: ProductFixture = ProductFixture {
    id: "classic-jar",
    name: "Classic Jar",
    model_path: "/models/jar.glb",
    meshes: &["Jar_Top_001", "Jar_Body", "glass_base"],
};

pub const BLACK_JAR: ProductFixture = ProductFixture {
    id: "black-jar",
    name: "Black Glass Jar",
    model_path: "/models/blkjar.glb",
    meshes: &["Jar_Top_001", "Jar_Body", "glass_base"],
};

pub const GLASS_JAR: ProductFixture = ProductFixture {
    id: "glass-jar",
    name: "Glass Jar",
    model_path: "/models/glassjar2.glb?v=3",
    meshes: &["Lid", "Body", "Bottom"],
};

pub const POUCH: ProductFixture = ProductFixture {
    id: "stand-pouch",
    name: "Stand-up Pouch",
    model_path: "/models/pouch.glb",
    meshes: &["Pouch", "Plane001_1", "Zipper"],
};

// ── Scene Builders ──────────────────────────────────────────────────────────

/// Meshes as the host reports them after a model load, each with a plain
/// grey standard material.
pub fn scene_meshes(names: &[&str]) -> Vec<SceneMesh> {
    names
        .iter()
        .map(|name| SceneMesh {
            name: name.to_string(),
            material: grey(),
        })
        .collect()
}

pub fn grey() -> Material {
    let mut material = Material::standard();
    material.color = Rgb::new(0x80, 0x80, 0x80);
    material
}

/// Parse a hex color in a fixture.
pub fn hex(value: &str) -> Result<Rgb, HarnessError> {
    Rgb::from_hex(value).map_err(|e| HarnessError::AssertionFailed {
        detail: e.to_string(),
    })
}

/// A minimal PBR material set with one wood material and its two maps.
pub const WOOD_SET: &str = r#"{
    "version": "1.0",
    "materials": [
        {
            "id": "oak",
            "name": "Oak",
            "category": "wood",
            "maps": {
                "diffuse": "/pbr/oak/diffuse.jpg",
                "normal": "/pbr/oak/normal.jpg"
            },
            "properties": { "roughness": 0.8, "metallic": 0.0, "normalScale": 0.5 },
            "tiling": { "repeatU": 2.0, "repeatV": 2.0 },
            "targetParts": ["all", "middle"]
        }
    ]
}"#;
