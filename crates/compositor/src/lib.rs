pub mod compose;
pub mod config;
pub mod pbr;
pub mod reflectiveness;
pub mod scene;
pub mod texture;
pub mod transform;

pub use compose::{
    referenced_urls, CompositionInput, CompositionReport, Compositor, LayerSkip, MeshOutcome,
    SkipReason,
};
pub use config::CompositorConfig;
pub use pbr::{PbrChannels, PbrError, PbrLibrary, PbrMaps, PbrMaterial, PbrMaterialSet};
pub use reflectiveness::ReflectivenessParams;
pub use scene::{
    MeshHandle, MeshInfo, OverlaySpec, RetainedMesh, RetainedScene, SceneChange, SceneError,
    SceneGraph, LOGO_OVERLAY_TAG,
};
pub use texture::{
    QueuedLoader, TextureCache, TextureError, TextureEvent, TextureInfo, TextureLoader,
    TextureRequest, TextureRole, TextureStatus,
};
pub use transform::{artwork_transform, logo_scale, logo_transform, LogoScale};
