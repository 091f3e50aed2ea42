pub mod errors;
pub mod model;
pub mod save;
pub mod store;
pub mod thumbnail;

pub use errors::ProjectError;
pub use model::{
    export_file_name, Project, ProjectExport, ProjectLayer, ProjectLayerState, ProjectModelState,
    ProjectSummary, PROJECT_VERSION,
};
pub use save::{capture_project, new_project_id, SaveRequest};
pub use store::{KeyValueStore, MemoryStore, ProjectStore, STORAGE_KEY};
