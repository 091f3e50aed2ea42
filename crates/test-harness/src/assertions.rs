//! Rich assertion helpers with diagnostic output.
//!
//! Every failure names the mesh and shows expected vs actual.

use compositor::ReflectivenessParams;
use layer_engine::CustomizationLayer;
use studio_types::Material;

use crate::helpers::{hex, HarnessError};
use crate::workflow::StudioBuilder;

/// Assert a mesh's base color.
pub fn assert_color(b: &StudioBuilder, mesh: &str, expected: &str) -> Result<(), HarnessError> {
    let expected = hex(expected)?;
    let actual = b.material(mesh)?.color;
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{mesh}] expected color {expected}, got {actual}"),
        })
    }
}

/// Assert the URL of a mesh's diffuse map, or its absence with `None`.
pub fn assert_map(
    b: &StudioBuilder,
    mesh: &str,
    expected: Option<&str>,
) -> Result<(), HarnessError> {
    let actual = b.material(mesh)?.map.as_ref().map(|m| m.url.as_str());
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{mesh}] expected map {expected:?}, got {actual:?}"),
        })
    }
}

/// Assert the reflectiveness-derived surface of a physical material.
pub fn assert_reflective(
    material: &Material,
    reflectiveness: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let want = ReflectivenessParams::from_scalar(reflectiveness);
    let physical = material.physical.as_ref().ok_or_else(|| HarnessError::AssertionFailed {
        detail: format!("[{ctx}] material is not physical"),
    })?;
    let checks = [
        ("roughness", material.roughness, want.roughness),
        ("metalness", material.metalness, want.metalness),
        ("envMapIntensity", material.env_map_intensity, want.env_map_intensity),
        ("clearcoat", physical.clearcoat, want.clearcoat),
        ("clearcoatRoughness", physical.clearcoat_roughness, want.clearcoat_roughness),
        ("reflectivity", physical.reflectivity, want.reflectivity),
        ("ior", physical.ior, want.ior),
    ];
    for (field, actual, expected) in checks {
        if (actual - expected).abs() > 1e-9 {
            return Err(HarnessError::AssertionFailed {
                detail: format!("[{ctx}] {field}: expected {expected:.4}, got {actual:.4}"),
            });
        }
    }
    Ok(())
}

/// Assert `order` is exactly `0..n` in list order.
pub fn assert_dense_order(layers: &[CustomizationLayer]) -> Result<(), HarnessError> {
    for (i, layer) in layers.iter().enumerate() {
        if layer.order != i {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "layer {:?} at index {} has order {}",
                    layer.name, i, layer.order
                ),
            });
        }
    }
    Ok(())
}
