use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use compositor::{
    referenced_urls, CompositionInput, CompositionReport, Compositor, CompositorConfig,
    PbrLibrary, QueuedLoader, RetainedScene, TextureCache, TextureError, TextureInfo,
};
use layer_engine::{classify, LayerOptions, LayerStore};
use product_state::{ModelConfigTable, Product, ProductError, ProductStateStore};
use project_format::{KeyValueStore, MemoryStore, Project, ProjectStore, SaveRequest};
use studio_types::{CustomizationUpdate, Region, TargetPart, TextureId};

use crate::messages::{SceneDelta, SceneMesh};

/// Everything the studio holds for one browser session.
///
/// Store subscriptions raise a shared dirty flag; [`StudioState::recompose`]
/// runs the compositor at most once per raised flag.
pub struct StudioState {
    pub layers: LayerStore,
    pub products: ProductStateStore,
    /// The selected product, if any.
    pub product: Option<Product>,
    pub scene: RetainedScene,
    pub textures: TextureCache,
    pub loader: QueuedLoader,
    pub pbr: PbrLibrary,
    pub projects: ProjectStore<Box<dyn KeyValueStore>>,
    compositor: Compositor,
    dirty: Rc<Cell<bool>>,
    freed: Vec<TextureId>,
}

impl StudioState {
    pub fn new() -> Self {
        Self::with_parts(
            CompositorConfig::default(),
            ModelConfigTable::builtin(),
            Box::new(MemoryStore::new()),
        )
    }

    pub fn with_parts(
        config: CompositorConfig,
        table: ModelConfigTable,
        project_backend: Box<dyn KeyValueStore>,
    ) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let mut layers = LayerStore::new();
        let mut products = ProductStateStore::new(table);
        let mut textures = TextureCache::new();

        let flag = Rc::clone(&dirty);
        layers.subscribe(move |_| flag.set(true));
        let flag = Rc::clone(&dirty);
        products.subscribe(move |_| flag.set(true));
        let flag = Rc::clone(&dirty);
        textures.subscribe(move |_| flag.set(true));

        Self {
            layers,
            products,
            product: None,
            scene: RetainedScene::new(),
            textures,
            loader: QueuedLoader::new(),
            pbr: PbrLibrary::new(),
            projects: ProjectStore::new(project_backend),
            compositor: Compositor::new(config),
            dirty,
            freed: Vec::new(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    // ── Product ─────────────────────────────────────────────────────────

    /// Top-level product change. Always a full reset, even when the same
    /// product is selected again. Returns false when the product has no
    /// model yet.
    pub fn select_product(
        &mut self,
        product_id: &str,
        product_name: &str,
        model_path: &str,
    ) -> Result<bool, BridgeError> {
        if model_path.is_empty() {
            warn!(product_id, "product has no model path, ignoring selection");
            return Ok(false);
        }
        self.switch_product(Product::new(product_id, product_name, model_path))?;
        Ok(true)
    }

    /// Full reset of layers, model state, scene and texture session.
    pub fn switch_product(&mut self, product: Product) -> Result<(), BridgeError> {
        info!(
            from = ?self.product.as_ref().map(|p| p.id.as_str()),
            to = %product.id,
            family = ?product.family,
            "product changed"
        );
        self.products
            .switch_to_product(&product.id, &product.model_path)?;
        self.layers.reset_for_product_switch(&product.id);
        self.scene = RetainedScene::new();
        let freed = self.textures.clear();
        self.freed.extend(freed);
        self.product = Some(product);
        Ok(())
    }

    // ── Scene events ────────────────────────────────────────────────────

    /// Replace the scene with a freshly loaded model and capture its
    /// original materials. Returns how many were captured.
    pub fn scene_loaded(&mut self, meshes: Vec<SceneMesh>) -> Result<usize, BridgeError> {
        if self.products.current().is_none() {
            return Err(ProductError::NoActiveProduct.into());
        }
        let mut captured = 0;
        for mesh in &meshes {
            if self
                .products
                .store_material_state(&mesh.name, mesh.material.clone())
            {
                captured += 1;
            }
        }
        self.scene = RetainedScene::from_meshes(meshes.into_iter().map(|m| (m.name, m.material)));
        info!(meshes = self.scene.len(), captured, "scene loaded");
        self.mark_dirty();
        Ok(captured)
    }

    /// Record a finished load. A late result from an earlier session is
    /// handed back to the host for disposal.
    pub fn texture_loaded(&mut self, url: &str, generation: u64, info: TextureInfo) -> bool {
        match self.textures.complete(url, generation, info) {
            Ok(()) => true,
            Err(e) => {
                self.discard_result(e);
                self.freed.push(info.id);
                false
            }
        }
    }

    pub fn texture_failed(&mut self, url: &str, generation: u64, reason: &str) -> bool {
        match self.textures.fail(url, generation, reason) {
            Ok(()) => true,
            Err(e) => {
                self.discard_result(e);
                false
            }
        }
    }

    pub fn retry_texture(&mut self, url: &str) -> bool {
        let retried = self.textures.retry(url, &mut self.loader);
        if retried {
            self.mark_dirty();
        }
        retried
    }

    fn discard_result(&self, error: TextureError) {
        debug!(%error, "discarding texture result");
    }

    /// Region of a picked mesh and the part it maps to.
    pub fn pick_mesh(&self, mesh_name: &str) -> (Region, Option<TargetPart>) {
        let region = classify(mesh_name);
        debug!(mesh_name, %region, "mesh picked");
        (region, region.into())
    }

    // ── Projects ────────────────────────────────────────────────────────

    pub fn save_project(&mut self, request: &SaveRequest) -> Result<String, BridgeError> {
        let product = self.product.as_ref().ok_or(BridgeError::NoProduct)?;
        let state = self
            .products
            .current()
            .ok_or(ProductError::NoActiveProduct)?;
        Ok(self
            .projects
            .save(request, product, state, self.layers.state())?)
    }

    pub fn load_project(&mut self, project_id: &str) -> Result<(), BridgeError> {
        let project = self.projects.load(project_id)?;
        self.apply_project(&project)
    }

    /// Switch to the project's product and rebuild its session.
    ///
    /// Layers get fresh ids; the stored active layer is mapped onto its
    /// recreated layer.
    pub fn apply_project(&mut self, project: &Project) -> Result<(), BridgeError> {
        self.switch_product(Product::new(
            project.product_id.as_str(),
            project.product_name.as_str(),
            project.model_path.as_str(),
        ))?;

        let model = &project.model_state;
        self.products.update_customization(&CustomizationUpdate::from(
            model.customization_state.clone(),
        ))?;
        if let Some(scale) = model.scale {
            self.products.update_scale(scale)?;
        }
        if let Some(distance) = model.camera_distance {
            self.products.update_camera_distance(distance)?;
        }

        let mut recreated: HashMap<&str, Uuid> = HashMap::new();
        for stored in project.layer_state.ordered() {
            let layer = self.layers.create_layer(
                stored.name.as_str(),
                stored.kind,
                stored.target_part,
                stored.value.as_str(),
                LayerOptions {
                    position: stored.position,
                    scale: stored.scale,
                    material_id: stored.material_id.clone(),
                    material_type: stored.material_type,
                    reflectiveness: stored.reflectiveness,
                },
            );
            if !stored.is_visible {
                self.layers.toggle_visibility(layer.id)?;
            }
            recreated.insert(stored.id.as_str(), layer.id);
        }

        let active = project
            .layer_state
            .active_layer_id
            .as_deref()
            .and_then(|old| recreated.get(old).copied());
        self.layers.set_active_layer(active)?;
        info!(
            project = %project.id,
            layers = recreated.len(),
            "applied project"
        );
        Ok(())
    }

    // ── Composition ─────────────────────────────────────────────────────

    /// Recompose the scene if anything changed since the last pass.
    pub fn recompose(&mut self) -> Option<CompositionReport> {
        if !self.dirty.replace(false) {
            return None;
        }
        let state = self.products.current()?;
        let input = CompositionInput::new(self.layers.layers(), state);
        let report = self.compositor.compose(
            &mut self.scene,
            &input,
            &mut self.textures,
            &mut self.loader,
            &self.pbr,
        );

        let keep = referenced_urls(self.layers.layers(), &state.customization, &self.pbr);
        let freed = self.textures.retain_urls(&keep);
        self.freed.extend(freed);
        Some(report)
    }

    /// Scene work accumulated since the last call.
    pub fn take_delta(&mut self) -> SceneDelta {
        SceneDelta {
            changes: self.scene.take_changes(),
            texture_requests: self.loader.drain(),
            freed_textures: std::mem::take(&mut self.freed),
        }
    }
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from the bridge layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("layer error: {0}")]
    Layer(#[from] layer_engine::LayerError),

    #[error("product error: {0}")]
    Product(#[from] ProductError),

    #[error("material error: {0}")]
    Pbr(#[from] compositor::PbrError),

    #[error("project error: {0}")]
    Project(#[from] project_format::ProjectError),

    #[error("no product selected")]
    NoProduct,

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl BridgeError {
    /// The layer an error is about, if any.
    pub fn layer_id(&self) -> Option<Uuid> {
        match self {
            BridgeError::Layer(layer_engine::LayerError::NotFound { id }) => Some(*id),
            _ => None,
        }
    }
}
