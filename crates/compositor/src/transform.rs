//! Texture-space transforms derived from layer position and scale.

use studio_types::{Position, TextureTransform};

use crate::config::CompositorConfig;

/// Repeating pattern transform: scale drives repeat, position drives offset.
pub fn artwork_transform(
    position: Position,
    scale: Option<f64>,
    config: &CompositorConfig,
) -> TextureTransform {
    let scale = scale.unwrap_or(config.default_layer_scale);
    let repeat = 1.0 / scale.max(config.min_artwork_scale);
    TextureTransform {
        repeat: [repeat, repeat],
        offset: user_offset(position, config),
        center: config.texture_center,
    }
}

/// Aspect-corrected repeat of a logo texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoScale {
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Logo repeat from its scale and image aspect (width / height).
///
/// Above `logo_clamp_threshold` both components are capped at 1.0 so the
/// logo never tiles; below it small logos shrink freely.
pub fn logo_scale(scale: Option<f64>, aspect: f64, config: &CompositorConfig) -> LogoScale {
    let effective = scale
        .unwrap_or(config.default_layer_scale)
        .max(config.min_logo_scale);
    let base = 1.0 / effective;
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    };

    let (mut scale_x, mut scale_y) = if aspect > 1.0 {
        (base, base * aspect)
    } else {
        (base / aspect, base)
    };
    if effective > config.logo_clamp_threshold {
        scale_x = scale_x.min(1.0);
        scale_y = scale_y.min(1.0);
    }
    LogoScale { scale_x, scale_y }
}

/// Clamped logo transform, centered and then nudged by the layer position.
pub fn logo_transform(
    position: Position,
    scale: Option<f64>,
    aspect: f64,
    config: &CompositorConfig,
) -> TextureTransform {
    let LogoScale { scale_x, scale_y } = logo_scale(scale, aspect, config);
    let [ux, uy] = user_offset(position, config);
    TextureTransform {
        repeat: [scale_x, scale_y],
        offset: [(1.0 - scale_x) * 0.5 + ux, (1.0 - scale_y) * 0.5 + uy],
        center: config.texture_center,
    }
}

fn user_offset(position: Position, config: &CompositorConfig) -> [f64; 2] {
    [
        position.x * config.offset_sensitivity,
        -position.y * config.offset_sensitivity,
    ]
}
