use tracing::debug;

use crate::messages::{StudioToUi, UiToStudio};
use crate::studio_state::{BridgeError, StudioState};

/// Dispatch a UI message to the studio and return a response.
///
/// Every message that can change layers, model state, textures or the scene
/// is answered with [`StudioToUi::StudioUpdated`], after at most one
/// recomposition.
pub fn dispatch(state: &mut StudioState, msg: UiToStudio) -> StudioToUi {
    match handle_message(state, msg) {
        Ok(response) => response,
        Err(e) => StudioToUi::Error {
            message: e.to_string(),
            layer_id: e.layer_id(),
        },
    }
}

fn handle_message(state: &mut StudioState, msg: UiToStudio) -> Result<StudioToUi, BridgeError> {
    match msg {
        // -- Product --
        UiToStudio::SelectProduct {
            product_id,
            product_name,
            model_path,
        } => {
            state.select_product(&product_id, &product_name, &model_path)?;
            Ok(updated_response(state))
        }

        // -- Scene events --
        UiToStudio::SceneLoaded { meshes } => {
            state.scene_loaded(meshes)?;
            Ok(updated_response(state))
        }

        UiToStudio::TextureLoaded {
            url,
            generation,
            texture,
        } => {
            state.texture_loaded(&url, generation, texture);
            Ok(updated_response(state))
        }

        UiToStudio::TextureFailed {
            url,
            generation,
            reason,
        } => {
            state.texture_failed(&url, generation, &reason);
            Ok(updated_response(state))
        }

        UiToStudio::RetryTexture { url } => {
            state.retry_texture(&url);
            Ok(updated_response(state))
        }

        UiToStudio::PickMesh { mesh_name } => {
            let (region, target_part) = state.pick_mesh(&mesh_name);
            Ok(StudioToUi::MeshPicked {
                mesh_name,
                region,
                target_part,
            })
        }

        UiToStudio::GetModelDefaults { model_path } => {
            let defaults = state.products.default_values_for_model(&model_path);
            Ok(StudioToUi::ModelDefaults {
                model_path,
                defaults,
            })
        }

        // -- Layer operations --
        UiToStudio::CreateLayer {
            name,
            kind,
            target_part,
            value,
            options,
        } => {
            state
                .layers
                .create_layer(name, kind, target_part, value, options);
            Ok(updated_response(state))
        }

        UiToStudio::UpdateLayer { layer_id, update } => {
            state.layers.update_layer(layer_id, &update)?;
            Ok(updated_response(state))
        }

        UiToStudio::RenameLayer { layer_id, name } => {
            state.layers.rename_layer(layer_id, name)?;
            Ok(updated_response(state))
        }

        UiToStudio::UpdateLayerTransform {
            layer_id,
            position,
            scale,
        } => {
            state.layers.update_transform(layer_id, position, scale)?;
            Ok(updated_response(state))
        }

        UiToStudio::DeleteLayer { layer_id } => {
            state.layers.delete_layer(layer_id)?;
            Ok(updated_response(state))
        }

        UiToStudio::ToggleLayerVisibility { layer_id } => {
            state.layers.toggle_visibility(layer_id)?;
            Ok(updated_response(state))
        }

        UiToStudio::SetActiveLayer { layer_id } => {
            state.layers.set_active_layer(layer_id)?;
            Ok(updated_response(state))
        }

        UiToStudio::MoveLayerUp { layer_id } => {
            state.layers.move_layer_up(layer_id)?;
            Ok(updated_response(state))
        }

        UiToStudio::MoveLayerDown { layer_id } => {
            state.layers.move_layer_down(layer_id)?;
            Ok(updated_response(state))
        }

        UiToStudio::ReorderLayer {
            layer_id,
            new_position,
        } => {
            state.layers.reorder_layer(layer_id, new_position)?;
            Ok(updated_response(state))
        }

        UiToStudio::ClearLayers => {
            state.layers.clear_all();
            Ok(updated_response(state))
        }

        UiToStudio::ExportLayers => Ok(StudioToUi::LayersExported {
            json: state.layers.export_layers()?,
        }),

        UiToStudio::ImportLayers { data } => {
            state.layers.import_layers(&data)?;
            Ok(updated_response(state))
        }

        // -- Model state --
        UiToStudio::UpdateCustomization { update } => {
            state.products.update_customization(&update)?;
            Ok(updated_response(state))
        }

        UiToStudio::UpdateScale { scale } => {
            state.products.update_scale(scale)?;
            Ok(updated_response(state))
        }

        UiToStudio::UpdateCameraDistance { distance } => {
            state.products.update_camera_distance(distance)?;
            Ok(updated_response(state))
        }

        UiToStudio::UpdateModelHeight { height } => {
            state.products.update_model_height(height)?;
            Ok(updated_response(state))
        }

        // -- Materials --
        UiToStudio::LoadMaterialSet { data } => {
            let count = state.pbr.load_material_set(&data)?;
            debug!(count, "material set registered");
            state.mark_dirty();
            Ok(updated_response(state))
        }

        UiToStudio::ListMaterials { target_part } => {
            let materials = match target_part {
                Some(part) => state.pbr.for_part(part),
                None => state.pbr.all(),
            };
            Ok(StudioToUi::MaterialList {
                materials: materials.into_iter().cloned().collect(),
            })
        }

        // -- Projects --
        UiToStudio::SaveProject { request } => Ok(StudioToUi::ProjectSaved {
            project_id: state.save_project(&request)?,
        }),

        UiToStudio::LoadProject { project_id } => {
            state.load_project(&project_id)?;
            Ok(updated_response(state))
        }

        UiToStudio::ListProjects => Ok(StudioToUi::ProjectList {
            projects: state.projects.list()?,
        }),

        UiToStudio::DeleteProject { project_id } => {
            state.projects.delete(&project_id)?;
            Ok(StudioToUi::ProjectDeleted { project_id })
        }

        UiToStudio::ExportProject { project_id } => {
            let export = state.projects.export(&project_id)?;
            Ok(StudioToUi::ProjectExported {
                file_name: export.file_name,
                json: export.json,
            })
        }

        UiToStudio::ImportProject { data } => Ok(StudioToUi::ProjectImported {
            project_id: state.projects.import(&data)?,
        }),

        UiToStudio::GetState => Ok(updated_response(state)),
    }
}

/// Recompose if needed and report the current state.
fn updated_response(state: &mut StudioState) -> StudioToUi {
    let report = state.recompose();
    StudioToUi::StudioUpdated {
        layer_state: state.layers.state().clone(),
        product_state: state.products.current().cloned(),
        scene: state.take_delta(),
        report,
    }
}
