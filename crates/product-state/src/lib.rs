pub mod config;
pub mod family;
pub mod product;
pub mod state;
pub mod store;

pub use config::{model_file_name, ModelConfig, ModelConfigTable, DEFAULT_MODEL_CONFIG};
pub use family::{FamilyCapabilities, ProductFamily};
pub use product::Product;
pub use state::{ModelDefaults, ProductError, ProductState};
pub use store::ProductStateStore;
