use serde::{Deserialize, Serialize};
use uuid::Uuid;

use compositor::{CompositionReport, PbrMaterial, SceneChange, TextureInfo, TextureRequest};
use layer_engine::{LayerOptions, LayerState, LayerUpdate};
use product_state::{ModelDefaults, ProductState};
use project_format::{ProjectSummary, SaveRequest};
use studio_types::{
    CustomizationUpdate, LayerKind, Material, Position, Region, TargetPart, TextureId,
};

/// A mesh of a freshly loaded model, with the material it shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMesh {
    pub name: String,
    pub material: Material,
}

/// Messages from the UI (JavaScript main thread) to the studio.
/// Serialized as JSON for postMessage transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum UiToStudio {
    // -- Product --
    /// The user picked a product; resets layers and model state.
    SelectProduct {
        product_id: String,
        product_name: String,
        model_path: String,
    },

    // -- Scene events --
    /// The host finished loading the product's model.
    SceneLoaded { meshes: Vec<SceneMesh> },
    TextureLoaded {
        url: String,
        generation: u64,
        texture: TextureInfo,
    },
    TextureFailed {
        url: String,
        generation: u64,
        reason: String,
    },
    RetryTexture { url: String },
    /// The user clicked a mesh in the viewport.
    PickMesh { mesh_name: String },

    /// Initial scale and camera of a model, before it is selected.
    GetModelDefaults { model_path: String },

    // -- Layer operations --
    CreateLayer {
        name: String,
        kind: LayerKind,
        target_part: TargetPart,
        value: String,
        #[serde(default)]
        options: LayerOptions,
    },
    UpdateLayer {
        layer_id: Uuid,
        update: LayerUpdate,
    },
    RenameLayer {
        layer_id: Uuid,
        name: String,
    },
    UpdateLayerTransform {
        layer_id: Uuid,
        position: Position,
        scale: f64,
    },
    DeleteLayer { layer_id: Uuid },
    ToggleLayerVisibility { layer_id: Uuid },
    SetActiveLayer { layer_id: Option<Uuid> },
    MoveLayerUp { layer_id: Uuid },
    MoveLayerDown { layer_id: Uuid },
    ReorderLayer {
        layer_id: Uuid,
        new_position: usize,
    },
    ClearLayers,
    ExportLayers,
    ImportLayers { data: String },

    // -- Model state --
    UpdateCustomization { update: CustomizationUpdate },
    UpdateScale { scale: [f64; 3] },
    UpdateCameraDistance { distance: f64 },
    UpdateModelHeight { height: f64 },

    // -- Materials --
    LoadMaterialSet { data: String },
    ListMaterials {
        #[serde(default)]
        target_part: Option<TargetPart>,
    },

    // -- Projects --
    SaveProject { request: SaveRequest },
    LoadProject { project_id: String },
    ListProjects,
    DeleteProject { project_id: String },
    ExportProject { project_id: String },
    ImportProject { data: String },

    /// Current state without changing anything.
    GetState,
}

/// Rendering work resulting from one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDelta {
    /// Material assignments, overlay creations and removals, in order.
    pub changes: Vec<SceneChange>,
    /// Textures the host should start loading.
    pub texture_requests: Vec<TextureRequest>,
    /// Loaded textures the host may dispose.
    pub freed_textures: Vec<TextureId>,
}

impl SceneDelta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
            && self.texture_requests.is_empty()
            && self.freed_textures.is_empty()
    }
}

/// Messages from the studio to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum StudioToUi {
    /// Studio state after a message, plus the scene work it caused.
    StudioUpdated {
        layer_state: LayerState,
        product_state: Option<ProductState>,
        scene: SceneDelta,
        /// Present when the scene was recomposed.
        report: Option<CompositionReport>,
    },

    MeshPicked {
        mesh_name: String,
        region: Region,
        /// `None` for unclassified meshes.
        target_part: Option<TargetPart>,
    },

    ModelDefaults {
        model_path: String,
        defaults: ModelDefaults,
    },

    LayersExported { json: String },

    MaterialList { materials: Vec<PbrMaterial> },

    ProjectSaved { project_id: String },
    ProjectList { projects: Vec<ProjectSummary> },
    ProjectDeleted { project_id: String },
    ProjectExported { file_name: String, json: String },
    ProjectImported { project_id: String },

    /// An error occurred; transient, never persisted.
    Error {
        message: String,
        layer_id: Option<Uuid>,
    },
}
