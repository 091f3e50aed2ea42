//! Key-value backed project storage.
//!
//! All projects live as one JSON object, keyed by project id, under
//! [`STORAGE_KEY`].

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{error, info, instrument};

use layer_engine::LayerState;
use product_state::{Product, ProductState};

use crate::errors::ProjectError;
use crate::model::{export_file_name, Project, ProjectExport, ProjectSummary};
use crate::save::{capture_project, new_project_id, now_millis, SaveRequest};
use crate::thumbnail;

pub const STORAGE_KEY: &str = "studio_projects";

/// Fields an imported file must carry.
const REQUIRED_FIELDS: [&str; 4] = ["id", "name", "modelState", "layerState"];

/// String storage the project store writes through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProjectError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), ProjectError>;
    fn remove(&mut self, key: &str) -> Result<(), ProjectError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, ProjectError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ProjectError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), ProjectError> {
        (**self).remove(key)
    }
}

/// In-memory [`KeyValueStore`] with an optional byte quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose value exceeds `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProjectError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ProjectError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(ProjectError::Storage {
                    reason: format!("quota of {quota} bytes exceeded"),
                });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ProjectError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Saved projects over a [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct ProjectStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ProjectStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Save the current session under a fresh id and return it.
    #[instrument(skip_all, fields(name = %request.name, product = %product.id))]
    pub fn save(
        &mut self,
        request: &SaveRequest,
        product: &Product,
        state: &ProductState,
        layers: &LayerState,
    ) -> Result<String, ProjectError> {
        if let Some(url) = &request.thumbnail {
            thumbnail::validate(url)?;
        }
        let project = capture_project(
            new_project_id(),
            request,
            product,
            state,
            layers,
            now_millis(),
        );
        let id = project.id.clone();
        self.insert(project)?;
        info!(%id, layers = layers.layers.len(), "saved project");
        Ok(id)
    }

    pub fn load(&self, id: &str) -> Result<Project, ProjectError> {
        let mut projects = self.read_all()?;
        let project = projects
            .remove(id)
            .ok_or_else(|| ProjectError::NotFound { id: id.to_string() })?;
        info!(id, name = %project.name, "loaded project");
        Ok(project)
    }

    pub fn contains(&self, id: &str) -> Result<bool, ProjectError> {
        Ok(self.read_all()?.contains_key(id))
    }

    /// Summaries, most recently updated first.
    pub fn list(&self) -> Result<Vec<ProjectSummary>, ProjectError> {
        let projects = self.read_all()?;
        let mut summaries: Vec<ProjectSummary> =
            projects.values().map(ProjectSummary::from).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ProjectError> {
        let mut projects = self.read_all()?;
        if projects.remove(id).is_none() {
            return Err(ProjectError::NotFound { id: id.to_string() });
        }
        self.write_all(&projects)?;
        info!(id, "deleted project");
        Ok(())
    }

    /// Remove every saved project.
    pub fn clear(&mut self) -> Result<(), ProjectError> {
        self.backend.remove(STORAGE_KEY)?;
        info!("cleared saved projects");
        Ok(())
    }

    pub fn export(&self, id: &str) -> Result<ProjectExport, ProjectError> {
        let project = self.load(id)?;
        let json = serde_json::to_string_pretty(&project)
            .map_err(|e| ProjectError::Parse(e.to_string()))?;
        Ok(ProjectExport {
            file_name: export_file_name(&project.name),
            json,
        })
    }

    /// Store an exported project under a new id and return it.
    ///
    /// Only the presence of the top-level fields is checked before decoding.
    #[instrument(skip_all)]
    pub fn import(&mut self, json: &str) -> Result<String, ProjectError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ProjectError::Parse(e.to_string()))?;
        for field in REQUIRED_FIELDS {
            if !is_present(value.get(field)) {
                return Err(ProjectError::InvalidFormat {
                    reason: format!("missing {field}"),
                });
            }
        }
        let mut project: Project =
            serde_json::from_value(value).map_err(|e| ProjectError::Parse(e.to_string()))?;

        let original = std::mem::replace(&mut project.id, new_project_id());
        project.updated_at = now_millis();
        let id = project.id.clone();
        self.insert(project)?;
        info!(%id, %original, "imported project");
        Ok(id)
    }

    fn insert(&mut self, project: Project) -> Result<(), ProjectError> {
        let mut projects = self.read_all()?;
        projects.insert(project.id.clone(), project);
        self.write_all(&projects)
    }

    /// The stored map; a corrupt value reads as empty.
    fn read_all(&self) -> Result<BTreeMap<String, Project>, ProjectError> {
        let Some(raw) = self.backend.get(STORAGE_KEY)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(projects) => Ok(projects),
            Err(e) => {
                error!(error = %e, "stored projects are corrupt, ignoring");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&mut self, projects: &BTreeMap<String, Project>) -> Result<(), ProjectError> {
        let raw = serde_json::to_string(projects).map_err(|e| ProjectError::Storage {
            reason: e.to_string(),
        })?;
        self.backend.set(STORAGE_KEY, raw)
    }
}

/// Truthiness of an imported field: present, non-null, non-empty.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
