use std::sync::Arc;

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::math::DMat4;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

use crate::engine::scene::backend::BevyScene;
use crate::model::glb::NodeTable;
use crate::model::inspector::{GltfNodeIndex, NodeNameMatcher};
use crate::model::lifecycle::{ModelController, ModelStage};
use crate::panels::view::InfoPanels;

/// Root entity of a placed model.
#[derive(Component, Debug)]
pub struct ModelRoot {
    pub generation: u64,
}

/// Model-to-fixed placement the root transform is derived from.
#[derive(Component, Debug, Clone, Copy)]
pub struct ModelPlacement(pub DMat4);

/// glTF asset still on its way in.
#[derive(Component)]
pub struct PendingModel {
    pub handle: Handle<Gltf>,
}

#[derive(Component, Clone)]
pub struct ModelNodes(pub Arc<NodeTable>);

/// Outcome of a pending load, if it has settled.
fn settled_load(
    asset_server: &AssetServer,
    gltfs: &Assets<Gltf>,
    handle: &Handle<Gltf>,
) -> Option<Result<Handle<Scene>, String>> {
    if let LoadState::Failed(error) = asset_server.load_state(handle.id()) {
        return Some(Err(error.to_string()));
    }

    match asset_server.get_recursive_dependency_load_state(handle.id())? {
        RecursiveDependencyLoadState::Loaded => {}
        RecursiveDependencyLoadState::Failed(error) => return Some(Err(error.to_string())),
        _ => return None,
    }

    let gltf = gltfs.get(handle)?;
    Some(
        gltf.default_scene
            .clone()
            .or_else(|| gltf.scenes.first().cloned())
            .ok_or_else(|| "The file contains no scenes.".to_string()),
    )
}

/// Hand finished loads back to the controller and show their scenes.
pub fn poll_pending_models(
    pending: Query<(Entity, &ModelRoot, &PendingModel)>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut controller: ResMut<ModelController>,
    mut panels: ResMut<InfoPanels>,
    mut scene: BevyScene,
) {
    for (entity, root, model) in &pending {
        let Some(outcome) = settled_load(&asset_server, &gltfs, &model.handle) else {
            continue;
        };

        let result = match outcome {
            Ok(scene_handle) => {
                scene.show_model_scene(entity, scene_handle);
                Ok(())
            }
            Err(message) => Err(message),
        };

        let accepted =
            controller.complete_load(root.generation, result, &mut scene, &mut panels);
        if !accepted {
            scene.despawn_model(entity);
        }
    }
}

/// Tag spawned glTF node entities with their node index for the inspector.
pub fn tag_gltf_nodes(
    trigger: Trigger<SceneInstanceReady>,
    models: Query<&ModelNodes>,
    children: Query<&Children>,
    names: Query<&Name, Without<Mesh3d>>,
    mut commands: Commands,
) {
    let root = trigger.target();
    let Ok(ModelNodes(table)) = models.get(root) else {
        return;
    };

    let named = children
        .iter_descendants_depth_first(root)
        .filter_map(|entity| names.get(entity).ok().map(|name| (entity, name.as_str())));
    let tagged = match_node_entities(table, named);

    debug!("Tagged {} of {} glTF nodes", tagged.len(), table.nodes.len());
    for (entity, index) in tagged {
        commands.entity(entity).insert(GltfNodeIndex(index));
    }
}

/// Pair named entities, visited depth-first, with node table indices.
fn match_node_entities<'a>(
    table: &NodeTable,
    named: impl Iterator<Item = (Entity, &'a str)>,
) -> Vec<(Entity, usize)> {
    let mut matcher = NodeNameMatcher::new(table);
    named
        .filter_map(|(entity, name)| matcher.claim(name).map(|index| (entity, index)))
        .collect()
}
