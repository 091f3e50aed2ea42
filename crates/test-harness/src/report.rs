//! Plain-text session reports.
//!
//! A report reads like the studio's side panel plus a per-mesh dump, which
//! is easier to scan in a failing test than raw JSON.

use std::fmt;

use layer_engine::classify;
use studio_types::{LayerKind, Region, Rgb};

use crate::workflow::StudioBuilder;

/// A complete session report.
pub struct StudioReport {
    pub product: Option<String>,
    pub layer_entries: Vec<LayerEntry>,
    pub mesh_entries: Vec<MeshEntry>,
    pub skipped: usize,
    pub errors: Vec<(String, String)>,
}

pub struct LayerEntry {
    pub index: usize,
    pub name: String,
    pub kind: LayerKind,
    pub target: String,
    pub visible: bool,
    pub active: bool,
}

pub struct MeshEntry {
    pub name: String,
    pub region: Region,
    pub color: Rgb,
    pub map: Option<String>,
    pub overlay: bool,
}

impl StudioReport {
    pub fn generate(b: &StudioBuilder) -> Self {
        let active = b.state.layers.active_layer_id();
        let layer_entries = b
            .state
            .layers
            .layers()
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerEntry {
                index,
                name: layer.name.clone(),
                kind: layer.kind,
                target: layer.target_part.to_string(),
                visible: layer.is_visible,
                active: active == Some(layer.id),
            })
            .collect();

        let mesh_entries = b
            .state
            .scene
            .iter()
            .map(|mesh| MeshEntry {
                name: mesh.name.clone(),
                region: classify(&mesh.name),
                color: mesh.material.color,
                map: mesh.material.map.as_ref().map(|m| m.url.clone()),
                overlay: mesh.overlay_of.is_some(),
            })
            .collect();

        let (skipped, errors) = match b.last_report() {
            Some(report) => (report.skipped.len(), report.errors.clone()),
            None => (0, Vec::new()),
        };

        Self {
            product: b.state.product.as_ref().map(|p| p.name.clone()),
            layer_entries,
            mesh_entries,
            skipped,
            errors,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Studio Report ===\n\n");
        out.push_str(&format!(
            "Product: {}\n\n",
            self.product.as_deref().unwrap_or("(none)")
        ));

        out.push_str(&format!("Layers ({}):\n", self.layer_entries.len()));
        for entry in &self.layer_entries {
            out.push_str(&format!(
                "  [{}] {} ({:?} -> {}){}{}\n",
                entry.index,
                entry.name,
                entry.kind,
                entry.target,
                if entry.visible { "" } else { " hidden" },
                if entry.active { " *" } else { "" },
            ));
        }

        out.push_str(&format!("\nMeshes ({}):\n", self.mesh_entries.len()));
        for entry in &self.mesh_entries {
            out.push_str(&format!(
                "  {}{} [{}] color={}",
                entry.name,
                if entry.overlay { " (overlay)" } else { "" },
                entry.region,
                entry.color
            ));
            if let Some(map) = &entry.map {
                out.push_str(&format!(" map={map}"));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "\nLast pass: {} skipped, {} errors\n",
            self.skipped,
            self.errors.len()
        ));
        for (mesh, message) in &self.errors {
            out.push_str(&format!("  ERROR {mesh}: {message}\n"));
        }
        out
    }
}

impl fmt::Display for StudioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
