//! The scene-graph seam and an in-memory retained scene.

use serde::{Deserialize, Serialize};
use tracing::debug;

use studio_types::Material;

/// Stable id of a mesh within one loaded scene.
pub type MeshHandle = u64;

/// Name fragment that marks logo overlay meshes.
pub const LOGO_OVERLAY_TAG: &str = "_logo_";

/// A mesh as seen by the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshInfo {
    pub handle: MeshHandle,
    pub name: String,
}

impl MeshInfo {
    pub fn is_overlay(&self) -> bool {
        self.name.contains(LOGO_OVERLAY_TAG)
    }
}

/// A transparent overlay cloned from a source mesh's geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySpec {
    pub source: MeshHandle,
    pub name: String,
    pub material: Material,
    /// Added to the source mesh's position.
    pub position_offset: [f64; 3],
}

/// Errors from a scene graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("unknown mesh: {handle}")]
    UnknownMesh { handle: MeshHandle },
}

/// Mesh-bearing scene graph consumed by the compositor.
pub trait SceneGraph {
    /// Every mesh, overlays included, in traversal order.
    fn meshes(&self) -> Vec<MeshInfo>;

    /// The material currently assigned to a mesh.
    fn material(&self, mesh: MeshHandle) -> Result<Material, SceneError>;

    /// Assign a material and mark the mesh for re-upload.
    fn set_material(&mut self, mesh: MeshHandle, material: Material) -> Result<(), SceneError>;

    /// Add an overlay mesh next to its source.
    fn spawn_overlay(&mut self, spec: OverlaySpec) -> Result<MeshHandle, SceneError>;

    /// Detach a mesh and dispose its geometry and material.
    fn remove_mesh(&mut self, mesh: MeshHandle) -> Result<(), SceneError>;
}

/// A change the host renderer must mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SceneChange {
    MaterialAssigned {
        handle: MeshHandle,
        name: String,
        material: Material,
    },
    #[serde(rename_all = "camelCase")]
    OverlayCreated {
        handle: MeshHandle,
        source: MeshHandle,
        name: String,
        material: Material,
        position_offset: [f64; 3],
    },
    MeshRemoved {
        handle: MeshHandle,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetainedMesh {
    pub handle: MeshHandle,
    pub name: String,
    pub material: Material,
    /// Set on overlays.
    pub overlay_of: Option<MeshHandle>,
    pub position_offset: [f64; 3],
    pub needs_update: bool,
}

/// In-memory scene that records every change for the host to replay.
#[derive(Debug, Default)]
pub struct RetainedScene {
    meshes: Vec<RetainedMesh>,
    next_handle: MeshHandle,
    disposed: usize,
    changes: Vec<SceneChange>,
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene whose handles are the indices of `meshes`.
    pub fn from_meshes(meshes: impl IntoIterator<Item = (String, Material)>) -> Self {
        let mut scene = Self::new();
        for (name, material) in meshes {
            scene.add_mesh(name, material);
        }
        scene
    }

    pub fn add_mesh(&mut self, name: impl Into<String>, material: Material) -> MeshHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.meshes.push(RetainedMesh {
            handle,
            name: name.into(),
            material,
            overlay_of: None,
            position_offset: [0.0; 3],
            needs_update: false,
        });
        handle
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&RetainedMesh> {
        self.meshes.iter().find(|m| m.handle == handle)
    }

    /// First mesh with exactly this name.
    pub fn mesh_by_name(&self, name: &str) -> Option<&RetainedMesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Every mesh, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RetainedMesh> {
        self.meshes.iter()
    }

    pub fn overlays(&self) -> impl Iterator<Item = &RetainedMesh> {
        self.meshes.iter().filter(|m| m.overlay_of.is_some())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Meshes removed and disposed so far.
    pub fn disposed_count(&self) -> usize {
        self.disposed
    }

    /// Changes since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        for mesh in &mut self.meshes {
            mesh.needs_update = false;
        }
        std::mem::take(&mut self.changes)
    }

    fn find_mut(&mut self, handle: MeshHandle) -> Result<&mut RetainedMesh, SceneError> {
        self.meshes
            .iter_mut()
            .find(|m| m.handle == handle)
            .ok_or(SceneError::UnknownMesh { handle })
    }
}

impl SceneGraph for RetainedScene {
    fn meshes(&self) -> Vec<MeshInfo> {
        self.meshes
            .iter()
            .map(|m| MeshInfo {
                handle: m.handle,
                name: m.name.clone(),
            })
            .collect()
    }

    fn material(&self, mesh: MeshHandle) -> Result<Material, SceneError> {
        self.mesh(mesh)
            .map(|m| m.material.clone())
            .ok_or(SceneError::UnknownMesh { handle: mesh })
    }

    fn set_material(&mut self, mesh: MeshHandle, material: Material) -> Result<(), SceneError> {
        let entry = self.find_mut(mesh)?;
        entry.material = material.clone();
        entry.needs_update = true;
        let name = entry.name.clone();
        self.changes.push(SceneChange::MaterialAssigned {
            handle: mesh,
            name,
            material,
        });
        Ok(())
    }

    fn spawn_overlay(&mut self, spec: OverlaySpec) -> Result<MeshHandle, SceneError> {
        self.find_mut(spec.source)?;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.meshes.push(RetainedMesh {
            handle,
            name: spec.name.clone(),
            material: spec.material.clone(),
            overlay_of: Some(spec.source),
            position_offset: spec.position_offset,
            needs_update: true,
        });
        debug!(handle, name = %spec.name, "spawned overlay");
        self.changes.push(SceneChange::OverlayCreated {
            handle,
            source: spec.source,
            name: spec.name,
            material: spec.material,
            position_offset: spec.position_offset,
        });
        Ok(handle)
    }

    fn remove_mesh(&mut self, mesh: MeshHandle) -> Result<(), SceneError> {
        let pos = self
            .meshes
            .iter()
            .position(|m| m.handle == mesh)
            .ok_or(SceneError::UnknownMesh { handle: mesh })?;
        let removed = self.meshes.remove(pos);
        self.disposed += 1;
        self.changes.push(SceneChange::MeshRemoved {
            handle: mesh,
            name: removed.name,
        });
        Ok(())
    }
}
