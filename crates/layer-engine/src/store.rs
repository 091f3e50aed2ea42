use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use studio_types::{LayerKind, Position, Region, SubscriptionId, Subscribers, TargetPart};

use crate::types::{
    CustomizationLayer, LayerError, LayerOptions, LayerState, LayerUpdate,
    DEFAULT_LAYER_REFLECTIVENESS,
};

/// Ordered customization layers of the current product.
///
/// Every mutation notifies subscribers synchronously with the new
/// [`LayerState`]. Layers are kept sorted with dense `order` values.
#[derive(Debug, Default)]
pub struct LayerStore {
    state: LayerState,
    current_product: Option<String>,
    subscribers: Subscribers<LayerState>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    /// All layers in compositing order.
    pub fn layers(&self) -> &[CustomizationLayer] {
        &self.state.layers
    }

    pub fn layer(&self, id: Uuid) -> Option<&CustomizationLayer> {
        self.state.layers.iter().find(|l| l.id == id)
    }

    pub fn active_layer_id(&self) -> Option<Uuid> {
        self.state.active_layer_id
    }

    pub fn active_layer(&self) -> Option<&CustomizationLayer> {
        self.state.active_layer_id.and_then(|id| self.layer(id))
    }

    /// Visible layers targeting `part` or the wildcard, in compositing order.
    pub fn visible_layers_for_part(&self, part: TargetPart) -> Vec<&CustomizationLayer> {
        self.state
            .layers
            .iter()
            .filter(|l| l.is_visible && (l.target_part == part || l.target_part == TargetPart::All))
            .collect()
    }

    /// Visible layers that apply to a mesh classified as `region`.
    pub fn layers_for_region(&self, region: Region) -> Vec<&CustomizationLayer> {
        layers_for_region(&self.state.layers, region)
    }

    pub fn current_product(&self) -> Option<&str> {
        self.current_product.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.state.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.layers.len()
    }

    // ── Subscription ────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&LayerState) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify(&mut self) {
        self.subscribers.notify(&self.state);
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Append a layer at the end of the order and make it active.
    pub fn create_layer(
        &mut self,
        name: impl Into<String>,
        kind: LayerKind,
        target_part: TargetPart,
        value: impl Into<String>,
        options: LayerOptions,
    ) -> CustomizationLayer {
        let reflectiveness = match options.reflectiveness {
            Some(r) => Some(r.clamp(0.0, 1.0)),
            None if kind.is_textured() => Some(DEFAULT_LAYER_REFLECTIVENESS),
            None => None,
        };
        let layer = CustomizationLayer {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            target_part,
            value: value.into(),
            is_visible: true,
            order: self.state.layers.len(),
            created_at: Utc::now(),
            position: options.position,
            scale: options.scale,
            material_id: options.material_id,
            material_type: options.material_type,
            reflectiveness,
        };
        info!(
            id = %layer.id,
            name = %layer.name,
            kind = ?kind,
            target = %target_part,
            "creating layer"
        );

        self.state.layers.push(layer.clone());
        self.state.active_layer_id = Some(layer.id);
        self.notify();
        layer
    }

    /// Merge the `Some` fields of `update` into a layer.
    pub fn update_layer(&mut self, id: Uuid, update: &LayerUpdate) -> Result<(), LayerError> {
        let layer = self.layer_mut(id)?;
        update.apply_to(layer);
        debug!(%id, "updated layer");
        self.notify();
        Ok(())
    }

    pub fn rename_layer(&mut self, id: Uuid, name: impl Into<String>) -> Result<(), LayerError> {
        self.update_layer(
            id,
            &LayerUpdate {
                name: Some(name.into()),
                ..Default::default()
            },
        )
    }

    pub fn update_position(&mut self, id: Uuid, position: Position) -> Result<(), LayerError> {
        self.update_layer(
            id,
            &LayerUpdate {
                position: Some(position),
                ..Default::default()
            },
        )
    }

    pub fn update_scale(&mut self, id: Uuid, scale: f64) -> Result<(), LayerError> {
        self.update_layer(
            id,
            &LayerUpdate {
                scale: Some(scale),
                ..Default::default()
            },
        )
    }

    /// Set position and scale together with a single notification.
    pub fn update_transform(
        &mut self,
        id: Uuid,
        position: Position,
        scale: f64,
    ) -> Result<(), LayerError> {
        self.update_layer(
            id,
            &LayerUpdate {
                position: Some(position),
                scale: Some(scale),
                ..Default::default()
            },
        )
    }

    /// Remove a layer and re-sequence the rest.
    ///
    /// If the removed layer was active, the first remaining layer (or none)
    /// becomes active.
    pub fn delete_layer(&mut self, id: Uuid) -> Result<CustomizationLayer, LayerError> {
        let pos = self.position_of(id)?;
        let removed = self.state.layers.remove(pos);
        self.resequence();

        if self.state.active_layer_id == Some(id) {
            self.state.active_layer_id = self.state.layers.first().map(|l| l.id);
        }
        info!(%id, remaining = self.state.layers.len(), "deleted layer");
        self.notify();
        Ok(removed)
    }

    /// Flip visibility; returns the new value.
    pub fn toggle_visibility(&mut self, id: Uuid) -> Result<bool, LayerError> {
        let layer = self.layer_mut(id)?;
        layer.is_visible = !layer.is_visible;
        let visible = layer.is_visible;
        debug!(%id, visible, "toggled layer visibility");
        self.notify();
        Ok(visible)
    }

    /// Select a layer for editing, or clear the selection with `None`.
    pub fn set_active_layer(&mut self, id: Option<Uuid>) -> Result<(), LayerError> {
        if let Some(id) = id {
            self.position_of(id)?;
        }
        self.state.active_layer_id = id;
        self.notify();
        Ok(())
    }

    /// Swap with the previous layer. Returns false at the top.
    pub fn move_layer_up(&mut self, id: Uuid) -> Result<bool, LayerError> {
        let pos = self.position_of(id)?;
        if pos == 0 {
            return Ok(false);
        }
        self.state.layers.swap(pos, pos - 1);
        self.resequence();
        self.notify();
        Ok(true)
    }

    /// Swap with the next layer. Returns false at the bottom.
    pub fn move_layer_down(&mut self, id: Uuid) -> Result<bool, LayerError> {
        let pos = self.position_of(id)?;
        if pos + 1 >= self.state.layers.len() {
            return Ok(false);
        }
        self.state.layers.swap(pos, pos + 1);
        self.resequence();
        self.notify();
        Ok(true)
    }

    /// Move a layer to `new_pos` (clamped). Returns false if nothing moved.
    pub fn reorder_layer(&mut self, id: Uuid, new_pos: usize) -> Result<bool, LayerError> {
        let old_pos = self.position_of(id)?;
        let clamped = new_pos.min(self.state.layers.len() - 1);
        if clamped == old_pos {
            return Ok(false);
        }
        let layer = self.state.layers.remove(old_pos);
        self.state.layers.insert(clamped, layer);
        self.resequence();
        self.notify();
        Ok(true)
    }

    /// Drop every layer and the active selection.
    pub fn clear_all(&mut self) {
        info!(count = self.state.layers.len(), "clearing all layers");
        self.state.layers.clear();
        self.state.active_layer_id = None;
        self.notify();
    }

    /// Clear the store only if `product_id` differs from the tracked product.
    ///
    /// Returns true if the store was cleared.
    pub fn switch_to_product(&mut self, product_id: &str) -> bool {
        if self.current_product.as_deref() == Some(product_id) {
            debug!(product_id, "same product, keeping layers");
            return false;
        }
        info!(from = ?self.current_product, to = product_id, "switching layer product");
        self.current_product = Some(product_id.to_string());
        self.clear_all();
        true
    }

    /// Unconditionally clear and track `product_id`.
    pub fn reset_for_product_switch(&mut self, product_id: &str) {
        info!(product_id, "resetting layers for product switch");
        self.current_product = Some(product_id.to_string());
        self.clear_all();
    }

    pub fn set_current_product(&mut self, product_id: Option<String>) {
        self.current_product = product_id;
    }

    /// Replace the whole state, re-sequencing by the incoming `order`.
    pub fn replace_state(&mut self, mut state: LayerState) {
        state.layers.sort_by_key(|l| l.order);
        if let Some(active) = state.active_layer_id {
            if !state.layers.iter().any(|l| l.id == active) {
                state.active_layer_id = None;
            }
        }
        self.state = state;
        self.resequence();
        self.notify();
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn position_of(&self, id: Uuid) -> Result<usize, LayerError> {
        self.state
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(LayerError::NotFound { id })
    }

    fn layer_mut(&mut self, id: Uuid) -> Result<&mut CustomizationLayer, LayerError> {
        self.state
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(LayerError::NotFound { id })
    }

    fn resequence(&mut self) {
        for (i, layer) in self.state.layers.iter_mut().enumerate() {
            layer.order = i;
        }
    }
}

/// Visible layers that apply to `region`, sorted by `order`.
pub fn layers_for_region(
    layers: &[CustomizationLayer],
    region: Region,
) -> Vec<&CustomizationLayer> {
    let mut applicable: Vec<&CustomizationLayer> = layers
        .iter()
        .filter(|l| l.is_visible && l.target_part.matches(region))
        .collect();
    applicable.sort_by_key(|l| l.order);
    applicable
}
