//! Message-based façade over the studio for a JavaScript host.

pub mod dispatch;
pub mod messages;
pub mod studio_state;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use dispatch::dispatch;
pub use messages::{SceneDelta, SceneMesh, StudioToUi, UiToStudio};
pub use studio_state::{BridgeError, StudioState};
