//! WASM entry points.
//!
//! Only compiled for `wasm32`. JavaScript calls these from the page that
//! owns the three.js scene.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::dispatch;
use crate::messages::{StudioToUi, UiToStudio};
use crate::studio_state::StudioState;

// Single-threaded studio state.
thread_local! {
    static STUDIO: RefCell<Option<StudioState>> = const { RefCell::new(None) };
}

/// Initialize the studio. Calling it again starts a fresh session.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    STUDIO.with(|cell| {
        *cell.borrow_mut() = Some(StudioState::new());
    });
}

/// Process a JSON `UiToStudio` message and return a JSON `StudioToUi`.
#[wasm_bindgen]
pub fn process_message(json_input: &str) -> String {
    let response = STUDIO.with(|cell| {
        let mut studio = cell.borrow_mut();
        let Some(studio) = studio.as_mut() else {
            return not_initialized();
        };
        match serde_json::from_str::<UiToStudio>(json_input) {
            Ok(msg) => dispatch::dispatch(studio, msg),
            Err(e) => StudioToUi::Error {
                message: format!("Failed to parse message: {e}"),
                layer_id: None,
            },
        }
    });
    to_json(&response)
}

/// Current layer state as JSON.
#[wasm_bindgen]
pub fn get_layer_state() -> String {
    STUDIO.with(|cell| match cell.borrow().as_ref() {
        Some(studio) => serde_json::to_string(studio.layers.state()).unwrap_or_default(),
        None => to_json(&not_initialized()),
    })
}

fn not_initialized() -> StudioToUi {
    StudioToUi::Error {
        message: "Studio not initialized. Call init() first.".to_string(),
        layer_id: None,
    }
}

fn to_json(response: &StudioToUi) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(r#"{{"type":"Error","message":"Serialization failed: {e}","layerId":null}}"#)
    })
}
