//! Full-scene material composition.
//!
//! Every pass rebuilds every mesh from its captured original material plus
//! the applicable layers. Nothing is carried over from the previous pass
//! except what the scene itself holds for meshes without a captured
//! original.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use layer_engine::{classify, layers_for_region, CustomizationLayer};
use product_state::{FamilyCapabilities, ProductFamily, ProductState};
use studio_types::{
    CustomizationSnapshot, LayerKind, Material, Region, Rgb, TargetPart, TextureTransform,
};

use crate::config::CompositorConfig;
use crate::pbr::PbrLibrary;
use crate::reflectiveness::ReflectivenessParams;
use crate::scene::{MeshHandle, MeshInfo, OverlaySpec, SceneGraph, LOGO_OVERLAY_TAG};
use crate::texture::{TextureCache, TextureLoader, TextureRole};
use crate::transform::{artwork_transform, logo_transform};

// ── Per-family surface tuning ───────────────────────────────────────────

const MATTE_ROUGHNESS: f64 = 0.7;
const MATTE_METALNESS: f64 = 0.05;

const TINTED_GLASS_ROUGHNESS: f64 = 0.1;
const TINTED_GLASS_OPACITY: f64 = 0.9;

const PRINTED_GLASS_ROUGHNESS: f64 = 0.3;

/// Everything a pass reads besides the scene and the caches.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInput<'a> {
    pub layers: &'a [CustomizationLayer],
    pub family: ProductFamily,
    pub customization: &'a CustomizationSnapshot,
    /// Captured original material per mesh name.
    pub originals: &'a HashMap<String, Material>,
}

impl<'a> CompositionInput<'a> {
    pub fn new(layers: &'a [CustomizationLayer], state: &'a ProductState) -> Self {
        Self {
            layers,
            family: state.family,
            customization: &state.customization,
            originals: &state.material_snapshot,
        }
    }
}

/// Why a layer had no effect on a mesh this pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    TexturePending,
    TextureFailed { reason: String },
    MaterialPending,
    /// Material layer without a PBR binding.
    NotPbr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSkip {
    pub layer_id: Uuid,
    pub mesh: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshOutcome {
    pub handle: MeshHandle,
    pub name: String,
    pub region: Region,
    /// Layers that changed the material, in application order.
    pub applied: Vec<Uuid>,
    /// The live preview was painted instead of layers.
    pub preview: bool,
}

/// Summary of one pass. Failures are recorded here, never raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionReport {
    pub meshes: Vec<MeshOutcome>,
    pub overlays_removed: usize,
    pub overlays_created: Vec<MeshHandle>,
    pub skipped: Vec<LayerSkip>,
    pub warnings: Vec<String>,
    /// (mesh name, message)
    pub errors: Vec<(String, String)>,
}

impl CompositionReport {
    pub fn outcome(&self, mesh_name: &str) -> Option<&MeshOutcome> {
        self.meshes.iter().find(|m| m.name == mesh_name)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True if any layer is waiting on an asset.
    pub fn has_pending(&self) -> bool {
        self.skipped.iter().any(|s| {
            matches!(
                s.reason,
                SkipReason::TexturePending | SkipReason::MaterialPending
            )
        })
    }
}

/// Rebuilds mesh materials from layers.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Recompute every mesh material and logo overlay of `scene`.
    #[instrument(skip_all, fields(layers = input.layers.len(), family = ?input.family))]
    pub fn compose(
        &self,
        scene: &mut dyn SceneGraph,
        input: &CompositionInput<'_>,
        textures: &mut TextureCache,
        loader: &mut dyn TextureLoader,
        pbr: &PbrLibrary,
    ) -> CompositionReport {
        let mut report = CompositionReport::default();

        for overlay in scene.meshes().into_iter().filter(MeshInfo::is_overlay) {
            match scene.remove_mesh(overlay.handle) {
                Ok(()) => report.overlays_removed += 1,
                Err(e) => report.errors.push((overlay.name, e.to_string())),
            }
        }

        let caps = input.family.capabilities();
        let mut pass = Pass {
            config: &self.config,
            input,
            caps,
            textures,
            loader,
            pbr,
            report: &mut report,
        };
        for mesh in scene.meshes() {
            if mesh.is_overlay() {
                continue;
            }
            pass.compose_mesh(scene, &mesh);
        }

        debug!(
            meshes = report.meshes.len(),
            overlays = report.overlays_created.len(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            "composition finished"
        );
        report
    }
}

/// Borrowed state of one composition pass.
struct Pass<'p, 'a> {
    config: &'p CompositorConfig,
    input: &'p CompositionInput<'a>,
    caps: FamilyCapabilities,
    textures: &'p mut TextureCache,
    loader: &'p mut dyn TextureLoader,
    pbr: &'p PbrLibrary,
    report: &'p mut CompositionReport,
}

impl Pass<'_, '_> {
    fn compose_mesh(&mut self, scene: &mut dyn SceneGraph, mesh: &MeshInfo) {
        let region = classify(&mesh.name);
        let applicable = layers_for_region(self.input.layers, region);

        let baseline = match self.input.originals.get(&mesh.name) {
            Some(original) => original.clone(),
            None => {
                warn!(mesh = %mesh.name, "no stored original material, using current");
                self.report
                    .warnings
                    .push(format!("no stored original material for mesh {}", mesh.name));
                match scene.material(mesh.handle) {
                    Ok(current) => current,
                    Err(e) => {
                        self.report.errors.push((mesh.name.clone(), e.to_string()));
                        return;
                    }
                }
            }
        };

        let mut working = if self.caps.clearcoat {
            baseline.to_physical()
        } else {
            baseline
        };
        self.tune_surface(&mut working, mesh, !applicable.is_empty());

        let mut outcome = MeshOutcome {
            handle: mesh.handle,
            name: mesh.name.clone(),
            region,
            applied: Vec::new(),
            preview: false,
        };

        let colors = applicable.iter().filter(|l| l.kind == LayerKind::Color);
        for layer in colors {
            self.apply_color(&mut working, layer, mesh, &mut outcome);
        }

        let materials = applicable.iter().filter(|l| l.kind == LayerKind::Material);
        for layer in materials {
            self.apply_pbr(&mut working, layer, mesh, &mut outcome);
        }

        let patterns = applicable
            .iter()
            .filter(|l| l.kind == LayerKind::Artwork && !l.is_logo());
        for layer in patterns {
            self.apply_pattern(&mut working, layer, mesh, &mut outcome);
        }

        let logos: Vec<OverlaySpec> = applicable
            .iter()
            .filter(|l| l.is_logo())
            .filter_map(|layer| self.logo_overlay(layer, mesh, &mut outcome))
            .collect();

        // Both preview color and preview artwork stay within the live target part.
        if applicable.is_empty() && self.input.customization.target_part.matches(region) {
            self.apply_preview(&mut working, mesh, &mut outcome);
        }

        if self.caps.clearcoat {
            ReflectivenessParams::from_scalar(self.input.customization.reflectiveness)
                .apply(&mut working);
        }

        if let Err(e) = scene.set_material(mesh.handle, working) {
            self.report.errors.push((mesh.name.clone(), e.to_string()));
            return;
        }
        for spec in logos {
            match scene.spawn_overlay(spec) {
                Ok(handle) => self.report.overlays_created.push(handle),
                Err(e) => self.report.errors.push((mesh.name.clone(), e.to_string())),
            }
        }

        debug!(
            mesh = %mesh.name,
            %region,
            layers = applicable.len(),
            applied = outcome.applied.len(),
            preview = outcome.preview,
            "composed mesh"
        );
        self.report.meshes.push(outcome);
    }

    /// Tinted glass only shows on named base meshes that carry layers.
    fn is_glass_base(&self, mesh: &MeshInfo) -> bool {
        self.caps.tinted_glass_base && mesh.name.to_lowercase().contains("base")
    }

    /// Family baseline applied before any layer.
    fn tune_surface(&self, working: &mut Material, mesh: &MeshInfo, has_layers: bool) {
        if self.caps.clearcoat {
            return;
        }
        if has_layers && self.is_glass_base(mesh) {
            working.roughness = TINTED_GLASS_ROUGHNESS;
            working.metalness = 0.0;
            working.transparent = true;
            working.opacity = TINTED_GLASS_OPACITY;
        } else {
            working.roughness = MATTE_ROUGHNESS;
            working.metalness = MATTE_METALNESS;
        }
    }

    fn apply_color(
        &mut self,
        working: &mut Material,
        layer: &CustomizationLayer,
        mesh: &MeshInfo,
        outcome: &mut MeshOutcome,
    ) {
        match Rgb::from_hex(&layer.value) {
            Ok(color) => {
                working.color = color;
                outcome.applied.push(layer.id);
            }
            Err(e) => self
                .report
                .errors
                .push((mesh.name.clone(), format!("layer {}: {e}", layer.id))),
        }
    }

    fn apply_pbr(
        &mut self,
        working: &mut Material,
        layer: &CustomizationLayer,
        mesh: &MeshInfo,
        outcome: &mut MeshOutcome,
    ) {
        let Some(material_id) = layer.pbr_material_id() else {
            self.skip(layer, mesh, SkipReason::NotPbr);
            return;
        };
        match self.pbr.resolve(
            material_id,
            self.textures,
            self.loader,
            self.config.max_anisotropy,
        ) {
            Ok(Some(channels)) => {
                channels.apply_to(working);
                outcome.applied.push(layer.id);
            }
            Ok(None) => self.skip(layer, mesh, SkipReason::MaterialPending),
            Err(e) => {
                error!(
                    layer = %layer.id,
                    mesh = %mesh.name,
                    error = %e,
                    "pbr material construction failed"
                );
                self.report
                    .errors
                    .push((mesh.name.clone(), format!("layer {}: {e}", layer.id)));
            }
        }
    }

    fn apply_pattern(
        &mut self,
        working: &mut Material,
        layer: &CustomizationLayer,
        mesh: &MeshInfo,
        outcome: &mut MeshOutcome,
    ) {
        let info = match self.textures.ensure(&layer.value, self.loader) {
            Ok(Some(info)) => info,
            Ok(None) => return self.skip(layer, mesh, SkipReason::TexturePending),
            Err(e) => {
                return self.skip(
                    layer,
                    mesh,
                    SkipReason::TextureFailed {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let transform = artwork_transform(layer.position_or_origin(), layer.scale, self.config);
        let targets_label = layer.target_part == TargetPart::Artwork
            || layer.name.to_lowercase().contains("artwork");
        if self.caps.clearcoat && targets_label {
            working.color = Rgb::WHITE;
        }
        working.map = Some(info.bind(
            &layer.value,
            TextureRole::Pattern,
            self.config.max_anisotropy,
            transform,
        ));
        if self.is_glass_base(mesh) {
            working.color = Rgb::WHITE;
            working.transparent = true;
            working.opacity = 1.0;
            working.roughness = PRINTED_GLASS_ROUGHNESS;
            working.metalness = 0.0;
        }
        outcome.applied.push(layer.id);
    }

    fn logo_overlay(
        &mut self,
        layer: &CustomizationLayer,
        mesh: &MeshInfo,
        outcome: &mut MeshOutcome,
    ) -> Option<OverlaySpec> {
        let info = match self.textures.ensure(&layer.value, self.loader) {
            Ok(Some(info)) => info,
            Ok(None) => {
                self.skip(layer, mesh, SkipReason::TexturePending);
                return None;
            }
            Err(e) => {
                self.skip(
                    layer,
                    mesh,
                    SkipReason::TextureFailed {
                        reason: e.to_string(),
                    },
                );
                return None;
            }
        };

        let transform = logo_transform(
            layer.position_or_origin(),
            layer.scale,
            info.aspect(),
            self.config,
        );
        let material = Material {
            map: Some(info.bind(
                &layer.value,
                TextureRole::Logo,
                self.config.max_anisotropy,
                transform,
            )),
            transparent: true,
            opacity: 1.0,
            alpha_test: self.config.logo_alpha_test,
            double_sided: true,
            depth_write: false,
            ..Material::standard()
        };
        outcome.applied.push(layer.id);
        Some(OverlaySpec {
            source: mesh.handle,
            name: format!("{}{}{}", mesh.name, LOGO_OVERLAY_TAG, layer.id),
            material,
            position_offset: [0.0, 0.0, self.config.logo_depth_offset],
        })
    }

    /// Live selection for meshes without layers.
    fn apply_preview(
        &mut self,
        working: &mut Material,
        mesh: &MeshInfo,
        outcome: &mut MeshOutcome,
    ) {
        let live = self.input.customization;
        if live.has_color_changed {
            match Rgb::from_hex(&live.selected_color) {
                Ok(color) => {
                    working.color = color;
                    outcome.preview = true;
                }
                Err(e) => self.report.warnings.push(format!("preview color: {e}")),
            }
        }

        let Some(url) = live.preview_artwork() else {
            return;
        };
        match self.textures.ensure(url, self.loader) {
            Ok(Some(info)) => {
                working.map = Some(info.bind(
                    url,
                    TextureRole::Preview,
                    self.config.max_anisotropy,
                    TextureTransform::default(),
                ));
                outcome.preview = true;
            }
            Ok(None) => debug!(mesh = %mesh.name, url, "preview texture pending"),
            Err(e) => self.report.warnings.push(format!("preview texture: {e}")),
        }
    }

    fn skip(&mut self, layer: &CustomizationLayer, mesh: &MeshInfo, reason: SkipReason) {
        debug!(layer = %layer.id, mesh = %mesh.name, ?reason, "layer skipped");
        self.report.skipped.push(LayerSkip {
            layer_id: layer.id,
            mesh: mesh.name.clone(),
            reason,
        });
    }
}

/// Every texture URL the current layers and live preview can reference.
///
/// Hidden layers are included so toggling visibility does not reload.
pub fn referenced_urls(
    layers: &[CustomizationLayer],
    customization: &CustomizationSnapshot,
    pbr: &PbrLibrary,
) -> HashSet<String> {
    let mut urls = HashSet::new();
    for layer in layers {
        match layer.kind {
            LayerKind::Artwork => {
                urls.insert(layer.value.clone());
            }
            LayerKind::Material => {
                if let Some(material) = layer.pbr_material_id().and_then(|id| pbr.get(id)) {
                    urls.extend(material.maps.bound_urls().map(str::to_string));
                }
            }
            LayerKind::Color => {}
        }
    }
    if let Some(url) = customization.preview_artwork() {
        urls.insert(url.to_string());
    }
    urls
}
