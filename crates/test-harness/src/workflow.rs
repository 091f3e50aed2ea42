//! StudioBuilder: fluent API for scripting studio sessions in tests.
//!
//! Wraps `studio_bridge::dispatch()` to test the real message path, and plays
//! the host: it answers texture requests and reports scene loads. Layers are
//! addressed by the names they were created with.

use std::collections::HashMap;

use compositor::{CompositionReport, TextureInfo, TextureRequest};
use layer_engine::LayerOptions;
use project_format::SaveRequest;
use studio_bridge::{dispatch, SceneDelta, StudioState, StudioToUi, UiToStudio};
use studio_types::{CustomizationUpdate, LayerKind, Material, MaterialType, TargetPart, TextureId};
use uuid::Uuid;

use crate::helpers::*;

/// A fluent builder for scripting and checking studio sessions.
pub struct StudioBuilder {
    pub state: StudioState,
    named_layers: HashMap<String, Uuid>,
    /// Requests the "host" has not answered yet.
    outstanding: Vec<TextureRequest>,
    freed: Vec<TextureId>,
    last_report: Option<CompositionReport>,
    next_texture: TextureId,
    history: Vec<(String, String)>,
    auto_check: bool,
}

impl StudioBuilder {
    pub fn new() -> Self {
        Self {
            state: StudioState::new(),
            named_layers: HashMap::new(),
            outstanding: Vec::new(),
            freed: Vec::new(),
            last_report: None,
            next_texture: 1,
            history: Vec::new(),
            auto_check: false,
        }
    }

    /// Select `product` and load its model in one call.
    pub fn with_product(product: ProductFixture) -> Result<Self, HarnessError> {
        let mut builder = Self::new();
        builder.select(product)?.load_scene(product.meshes)?;
        Ok(builder)
    }

    /// Enable auto-checking: after every pass, fail on composition errors.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    // ── Product and scene ───────────────────────────────────────────────

    pub fn select(&mut self, product: ProductFixture) -> Result<&mut Self, HarnessError> {
        self.send(
            "SelectProduct",
            UiToStudio::SelectProduct {
                product_id: product.id.into(),
                product_name: product.name.into(),
                model_path: product.model_path.into(),
            },
        )?;
        self.named_layers.clear();
        // A new session ignores anything still in flight.
        self.outstanding.clear();
        Ok(self)
    }

    pub fn load_scene(&mut self, meshes: &[&str]) -> Result<&mut Self, HarnessError> {
        self.send(
            "SceneLoaded",
            UiToStudio::SceneLoaded {
                meshes: scene_meshes(meshes),
            },
        )?;
        Ok(self)
    }

    // ── Layers ──────────────────────────────────────────────────────────

    pub fn color(&mut self, name: &str, part: TargetPart, hex: &str) -> Result<Uuid, HarnessError> {
        self.create(name, LayerKind::Color, part, hex, LayerOptions::default())
    }

    pub fn artwork(
        &mut self,
        name: &str,
        part: TargetPart,
        url: &str,
    ) -> Result<Uuid, HarnessError> {
        self.create(name, LayerKind::Artwork, part, url, LayerOptions::default())
    }

    /// Artwork layer placed as an overlay. The name must mention "logo".
    pub fn logo(
        &mut self,
        name: &str,
        part: TargetPart,
        url: &str,
        scale: f64,
    ) -> Result<Uuid, HarnessError> {
        let options = LayerOptions {
            scale: Some(scale),
            ..Default::default()
        };
        self.create(name, LayerKind::Artwork, part, url, options)
    }

    pub fn pbr(
        &mut self,
        name: &str,
        part: TargetPart,
        material_id: &str,
    ) -> Result<Uuid, HarnessError> {
        let options = LayerOptions {
            material_id: Some(material_id.into()),
            material_type: Some(MaterialType::Pbr),
            ..Default::default()
        };
        self.create(name, LayerKind::Material, part, material_id, options)
    }

    pub fn create(
        &mut self,
        name: &str,
        kind: LayerKind,
        part: TargetPart,
        value: &str,
        options: LayerOptions,
    ) -> Result<Uuid, HarnessError> {
        if self.named_layers.contains_key(name) {
            return Err(HarnessError::DuplicateName { name: name.into() });
        }
        self.send(
            "CreateLayer",
            UiToStudio::CreateLayer {
                name: name.into(),
                kind,
                target_part: part,
                value: value.into(),
                options,
            },
        )?;
        let id = self
            .state
            .layers
            .active_layer_id()
            .ok_or_else(|| HarnessError::DispatchError {
                message: "CreateLayer: no active layer after create".into(),
            })?;
        self.named_layers.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn delete(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        let layer_id = self.layer_id(name)?;
        self.send("DeleteLayer", UiToStudio::DeleteLayer { layer_id })?;
        self.named_layers.remove(name);
        Ok(self)
    }

    pub fn toggle(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        let layer_id = self.layer_id(name)?;
        self.send(
            "ToggleLayerVisibility",
            UiToStudio::ToggleLayerVisibility { layer_id },
        )?;
        Ok(self)
    }

    pub fn activate(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        let layer_id = self.layer_id(name)?;
        self.send(
            "SetActiveLayer",
            UiToStudio::SetActiveLayer {
                layer_id: Some(layer_id),
            },
        )?;
        Ok(self)
    }

    pub fn reorder(&mut self, name: &str, position: usize) -> Result<&mut Self, HarnessError> {
        let layer_id = self.layer_id(name)?;
        self.send(
            "ReorderLayer",
            UiToStudio::ReorderLayer {
                layer_id,
                new_position: position,
            },
        )?;
        Ok(self)
    }

    pub fn export_layers(&mut self) -> Result<String, HarnessError> {
        match dispatch(&mut self.state, UiToStudio::ExportLayers) {
            StudioToUi::LayersExported { json } => Ok(json),
            other => Err(unexpected("ExportLayers", other)),
        }
    }

    /// Replace the layer list from an export and re-map names.
    pub fn import_layers(&mut self, json: &str) -> Result<&mut Self, HarnessError> {
        self.send("ImportLayers", UiToStudio::ImportLayers { data: json.into() })?;
        self.remap_names();
        Ok(self)
    }

    // ── Customization ───────────────────────────────────────────────────

    pub fn customize(&mut self, update: CustomizationUpdate) -> Result<&mut Self, HarnessError> {
        self.send("UpdateCustomization", UiToStudio::UpdateCustomization { update })?;
        Ok(self)
    }

    pub fn reflectiveness(&mut self, value: f64) -> Result<&mut Self, HarnessError> {
        self.customize(CustomizationUpdate {
            reflectiveness: Some(value),
            ..Default::default()
        })
    }

    pub fn load_materials(&mut self, json: &str) -> Result<&mut Self, HarnessError> {
        self.send("LoadMaterialSet", UiToStudio::LoadMaterialSet { data: json.into() })?;
        Ok(self)
    }

    // ── Host simulation ─────────────────────────────────────────────────

    /// Answer every outstanding texture request with a `width` x `height`
    /// texture. Returns how many were delivered.
    pub fn land_textures(&mut self, width: u32, height: u32) -> Result<usize, HarnessError> {
        let requests = std::mem::take(&mut self.outstanding);
        let count = requests.len();
        for request in requests {
            let texture = TextureInfo {
                id: self.next_texture,
                width,
                height,
            };
            self.next_texture += 1;
            self.send(
                "TextureLoaded",
                UiToStudio::TextureLoaded {
                    url: request.url,
                    generation: request.generation,
                    texture,
                },
            )?;
        }
        Ok(count)
    }

    /// Fail every outstanding texture request.
    pub fn fail_textures(&mut self, reason: &str) -> Result<usize, HarnessError> {
        let requests = std::mem::take(&mut self.outstanding);
        let count = requests.len();
        for request in requests {
            self.send(
                "TextureFailed",
                UiToStudio::TextureFailed {
                    url: request.url,
                    generation: request.generation,
                    reason: reason.into(),
                },
            )?;
        }
        Ok(count)
    }

    // ── Projects ────────────────────────────────────────────────────────

    pub fn save(&mut self, name: &str) -> Result<String, HarnessError> {
        let request = SaveRequest {
            name: name.into(),
            ..Default::default()
        };
        match dispatch(&mut self.state, UiToStudio::SaveProject { request }) {
            StudioToUi::ProjectSaved { project_id } => {
                self.history.push(("SaveProject".into(), "ProjectSaved".into()));
                Ok(project_id)
            }
            other => Err(unexpected("SaveProject", other)),
        }
    }

    /// Load a saved project, replacing the session, and re-map names.
    pub fn load(&mut self, project_id: &str) -> Result<&mut Self, HarnessError> {
        self.outstanding.clear();
        self.send(
            "LoadProject",
            UiToStudio::LoadProject {
                project_id: project_id.into(),
            },
        )?;
        self.remap_names();
        Ok(self)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn layer_id(&self, name: &str) -> Result<Uuid, HarnessError> {
        self.named_layers
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::LayerNotFound { name: name.into() })
    }

    /// Layer names in composition order.
    pub fn layer_names(&self) -> Vec<String> {
        self.state
            .layers
            .layers()
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    pub fn material(&self, mesh: &str) -> Result<&Material, HarnessError> {
        self.state
            .scene
            .mesh_by_name(mesh)
            .map(|m| &m.material)
            .ok_or_else(|| HarnessError::MeshNotFound { name: mesh.into() })
    }

    pub fn last_report(&self) -> Option<&CompositionReport> {
        self.last_report.as_ref()
    }

    pub fn outstanding(&self) -> &[TextureRequest] {
        &self.outstanding
    }

    /// Texture ids the studio handed back for disposal so far.
    pub fn freed(&self) -> &[TextureId] {
        &self.freed
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    // ── Inline Assertions ───────────────────────────────────────────────

    pub fn assert_layer_count(&self, expected: usize) -> Result<&Self, HarnessError> {
        let actual = self.state.layers.len();
        if actual == expected {
            Ok(self)
        } else {
            Err(HarnessError::AssertionFailed {
                detail: format!(
                    "expected {} layers, got {}. Layers: {:?}",
                    expected,
                    actual,
                    self.layer_names()
                ),
            })
        }
    }

    /// Assert the last pass reported no errors.
    pub fn assert_no_errors(&self) -> Result<&Self, HarnessError> {
        self.check_report()?;
        Ok(self)
    }

    // ── Internal Helpers ────────────────────────────────────────────────

    fn send(&mut self, msg_type: &str, msg: UiToStudio) -> Result<(), HarnessError> {
        match dispatch(&mut self.state, msg) {
            StudioToUi::StudioUpdated { scene, report, .. } => {
                self.absorb(scene);
                if report.is_some() {
                    self.last_report = report;
                }
                self.history
                    .push((msg_type.to_string(), "StudioUpdated".to_string()));
                if self.auto_check {
                    self.check_report()?;
                }
                Ok(())
            }
            other => Err(unexpected(msg_type, other)),
        }
    }

    fn absorb(&mut self, delta: SceneDelta) {
        self.outstanding.extend(delta.texture_requests);
        self.freed.extend(delta.freed_textures);
    }

    fn remap_names(&mut self) {
        self.named_layers = self
            .state
            .layers
            .layers()
            .iter()
            .map(|l| (l.name.clone(), l.id))
            .collect();
    }

    fn check_report(&self) -> Result<(), HarnessError> {
        match self.last_report.as_ref().and_then(|r| r.errors.last()) {
            Some((mesh, message)) => Err(HarnessError::Composition {
                mesh: mesh.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for StudioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected(msg_type: &str, response: StudioToUi) -> HarnessError {
    match response {
        StudioToUi::Error { message, .. } => HarnessError::DispatchError { message },
        other => HarnessError::DispatchError {
            message: format!("{msg_type}: unexpected response {other:?}"),
        },
    }
}
