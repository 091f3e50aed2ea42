use tracing::{debug, info, instrument, warn};

use studio_types::{
    CustomizationSnapshot, CustomizationUpdate, Material, SubscriptionId, Subscribers,
};

use crate::config::{model_file_name, ModelConfigTable};
use crate::state::{ModelDefaults, ProductError, ProductState};

/// Owns the [`ProductState`] of the product on display.
///
/// Every state change notifies subscribers synchronously with the new
/// state, or `None` while no product is active.
#[derive(Debug)]
pub struct ProductStateStore {
    table: ModelConfigTable,
    current: Option<ProductState>,
    subscribers: Subscribers<Option<ProductState>>,
}

impl ProductStateStore {
    pub fn new(table: ModelConfigTable) -> Self {
        Self {
            table,
            current: None,
            subscribers: Subscribers::new(),
        }
    }

    pub fn table(&self) -> &ModelConfigTable {
        &self.table
    }

    pub fn current(&self) -> Option<&ProductState> {
        self.current.as_ref()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Option<ProductState>) + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify(&mut self) {
        self.subscribers.notify(&self.current);
    }

    /// Replace the current state with a fresh one for `product_id`.
    pub fn initialize_for_product(
        &mut self,
        product_id: &str,
        model_path: &str,
    ) -> Result<&ProductState, ProductError> {
        if model_path.is_empty() {
            return Err(ProductError::MissingModelPath {
                product_id: product_id.to_string(),
            });
        }
        let config = self.table.lookup(model_path);
        info!(
            product_id,
            file = model_file_name(model_path),
            scale = config.scale,
            camera_distance = config.camera_distance,
            camera_y = config.camera_y,
            model_height = config.model_height,
            "initializing product state"
        );
        self.current = Some(ProductState::fresh(product_id, model_path, config));
        self.notify();
        self.current.as_ref().ok_or(ProductError::NoActiveProduct)
    }

    /// Drop the current state, then initialize `product_id` from the table.
    ///
    /// Always a full reset, even when `product_id` is already current.
    /// Subscribers see `None` before the new state.
    #[instrument(skip(self))]
    pub fn switch_to_product(
        &mut self,
        product_id: &str,
        model_path: &str,
    ) -> Result<&ProductState, ProductError> {
        if model_path.is_empty() {
            return Err(ProductError::MissingModelPath {
                product_id: product_id.to_string(),
            });
        }
        info!(
            from = ?self.current.as_ref().map(|s| s.product_id.as_str()),
            to = product_id,
            "switching product"
        );
        self.current = None;
        self.notify();
        self.initialize_for_product(product_id, model_path)
    }

    pub fn update_customization(
        &mut self,
        update: &CustomizationUpdate,
    ) -> Result<(), ProductError> {
        let state = self.current_mut("update customization")?;
        state.customization.apply(update);
        state.touch();
        debug!(?update, "updated customization");
        self.notify();
        Ok(())
    }

    pub fn update_scale(&mut self, scale: [f64; 3]) -> Result<(), ProductError> {
        let state = self.current_mut("update scale")?;
        state.scale = scale;
        state.touch();
        debug!(?scale, "updated scale");
        self.notify();
        Ok(())
    }

    pub fn update_camera_distance(&mut self, distance: f64) -> Result<(), ProductError> {
        let state = self.current_mut("update camera distance")?;
        state.camera_distance = distance;
        state.touch();
        debug!(distance, "updated camera distance");
        self.notify();
        Ok(())
    }

    pub fn update_model_height(&mut self, height: f64) -> Result<(), ProductError> {
        let state = self.current_mut("update model height")?;
        state.model_height = height;
        state.touch();
        debug!(height, "updated model height");
        self.notify();
        Ok(())
    }

    /// Capture the original material of a mesh. First write wins.
    ///
    /// Returns true if this call captured it. Not observable by
    /// subscribers.
    pub fn store_material_state(&mut self, mesh_name: &str, material: Material) -> bool {
        let Some(state) = self.current.as_mut() else {
            warn!(mesh_name, "no active product, material not captured");
            return false;
        };
        if state.material_snapshot.contains_key(mesh_name) {
            return false;
        }
        debug!(mesh_name, "captured original material");
        state.material_snapshot.insert(mesh_name.to_string(), material);
        true
    }

    pub fn material_state(&self, mesh_name: &str) -> Option<&Material> {
        self.current.as_ref()?.material_snapshot.get(mesh_name)
    }

    pub fn reset(&mut self) {
        info!("resetting product state");
        self.current = None;
        self.notify();
    }

    pub fn has_state_for_product(&self, product_id: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.product_id == product_id)
    }

    /// Side-effect-free table lookup for a model's initial presentation.
    pub fn default_values_for_model(&self, model_path: &str) -> ModelDefaults {
        let config = self.table.lookup(model_path);
        ModelDefaults {
            scale: config.scale_vec(),
            camera_distance: config.camera_distance,
        }
    }

    pub fn default_customization(&self) -> CustomizationSnapshot {
        CustomizationSnapshot::default()
    }

    fn current_mut(&mut self, action: &str) -> Result<&mut ProductState, ProductError> {
        match self.current.as_mut() {
            Some(state) => Ok(state),
            None => {
                warn!(action, "no active product");
                Err(ProductError::NoActiveProduct)
            }
        }
    }
}

impl Default for ProductStateStore {
    fn default() -> Self {
        Self::new(ModelConfigTable::builtin())
    }
}
