use bevy::asset::AssetMetaCheck;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::{CAMERA_FAR, CAMERA_NEAR};
use constants::viewer_defaults::LOG_FILTER;

// Crate engine modules
use crate::engine::camera::viewport_camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{AppState, announce_ready};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::memory_source::ModelMemorySource;
use crate::engine::loading::model_loader::{poll_pending_models, tag_gltf_nodes};
use crate::engine::loading::settings_loader::{
    SettingsLoader, ViewerSettings, finish_settings_load, start_settings_load,
};
use crate::engine::picking::{ScenePointerEvent, pick_under_cursor};
use crate::engine::scene::backend::follow_scene_origin;
use crate::engine::scene::grid::rebuild_ground_grid;
use crate::engine::scene::labels::position_world_labels;
use crate::engine::scene::markers::scale_screen_sized_visuals;
use crate::engine::scene::origin::SceneOrigin;
// Crate model, panel and tool modules
use crate::model::lifecycle::ModelController;
use crate::model::systems::{ModelCommand, announce_model_state, handle_model_commands};
use crate::panels::notify::announce_panel_changes;
use crate::panels::view::InfoPanels;
use crate::tools::measure::pointer::route_pointer_events;
use crate::tools::measure::session::MeasurementSession;
use crate::tools::tool_manager::{
    ClearToolEvent, ToolManager, ToolSelectionEvent, handle_clear_tool_events,
    handle_tool_keyboard_shortcuts, handle_tool_selection_events, sync_tool_state,
};
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    // Custom sources have to exist before the asset plugin builds.
    ModelMemorySource::register(&mut app);

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers ViewerSettings as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ViewerSettings>::new(&["json"]))
        .add_plugins(WebRpcPlugin);

    // Initialise resources early
    app.init_resource::<ViewerSettings>()
        .init_resource::<SettingsLoader>()
        .init_resource::<SceneOrigin>()
        .init_resource::<ViewportCamera>()
        .init_resource::<ModelController>()
        .init_resource::<MeasurementSession>()
        .init_resource::<InfoPanels>()
        .init_resource::<ToolManager>()
        .add_event::<ModelCommand>()
        .add_event::<ToolSelectionEvent>()
        .add_event::<ClearToolEvent>()
        .add_event::<ScenePointerEvent>()
        .add_observer(tag_gltf_nodes);

    app.add_systems(Startup, (setup, start_settings_load).chain())
        .add_systems(
            Update,
            finish_settings_load.run_if(in_state(AppState::Loading)),
        )
        .add_systems(OnEnter(AppState::Running), announce_ready);

    // Base runtime systems that run on all platforms.
    let runtime_systems = (
        camera_controller,
        // Host and keyboard input
        handle_tool_keyboard_shortcuts,
        handle_model_commands,
        poll_pending_models,
        handle_tool_selection_events,
        handle_clear_tool_events,
        // Pointer input after the tool state for this frame is settled
        pick_under_cursor,
        route_pointer_events,
        // Announcements
        sync_tool_state,
        announce_model_state,
        announce_panel_changes,
    )
        .chain();

    let scene_systems = (
        follow_scene_origin,
        rebuild_ground_grid,
        scale_screen_sized_visuals,
        position_world_labels,
    )
        .chain();

    app.add_systems(
        Update,
        (runtime_systems, scene_systems)
            .chain()
            .run_if(in_state(AppState::Running)),
    );

    #[cfg(not(target_arch = "wasm32"))]
    {
        use crate::panels::native::{spawn_info_panels, update_info_panels};
        app.add_systems(Startup, spawn_info_panels)
            .add_systems(Update, update_info_panels);
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    commands.insert_resource(AmbientLight {
        brightness: 400.0,
        ..default()
    });
}

fn spawn_viewport_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_xyz(0.0, 100.0, 0.0),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_viewport_camera(&mut commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: LOG_FILTER.to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
