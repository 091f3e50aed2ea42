pub mod classify;
pub mod exchange;
pub mod store;
pub mod types;

pub use classify::classify;
pub use exchange::LayerExport;
pub use store::{layers_for_region, LayerStore};
pub use types::*;
