use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::render_settings::{
    GRID_EXTENT_METRES, GRID_MAX_LINES, GRID_SPACING_METRES, LINE_PIXEL_WIDTH, MARKER_PIXEL_SIZE,
};
use constants::viewer_defaults::{
    DEFAULT_HEADING, HOME_VIEW_HEIGHT, HOME_VIEW_PITCH_DEGREES, SETTINGS_PATH,
};
use serde::{Deserialize, Serialize};

use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::engine::core::app_state::AppState;
use crate::engine::geodesy::Cartographic;
use crate::engine::scene::origin::SceneOrigin;
use crate::model::coordinates::Coordinates;
use crate::model::lifecycle::{FlyToSettings, ModelController};

/// Viewer configuration read from `assets/viewer_settings.json`.
///
/// Every field has a compiled default, so a partial file is fine and a
/// missing one changes nothing.
#[derive(Asset, Resource, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub default_coordinates: Coordinates,
    pub home_view: HomeView,
    pub fly_to: FlyToSettings,
    pub grid: GridSettings,
    pub marker_pixel_size: f32,
    pub line_pixel_width: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_coordinates: Coordinates::default(),
            home_view: HomeView::default(),
            fly_to: FlyToSettings::default(),
            grid: GridSettings::default(),
            marker_pixel_size: MARKER_PIXEL_SIZE,
            line_pixel_width: LINE_PIXEL_WIDTH,
        }
    }
}

impl ViewerSettings {
    /// Swap values that cannot be drawn for their defaults.
    pub fn validated(mut self) -> Self {
        if !self.grid.is_buildable() {
            warn!(
                "Ignoring grid extent {} and spacing {}, using defaults",
                self.grid.extent, self.grid.spacing
            );
            self.grid = GridSettings {
                enabled: self.grid.enabled,
                ..GridSettings::default()
            };
        }
        self.marker_pixel_size =
            positive_or("marker_pixel_size", self.marker_pixel_size, MARKER_PIXEL_SIZE);
        self.line_pixel_width =
            positive_or("line_pixel_width", self.line_pixel_width, LINE_PIXEL_WIDTH);
        self
    }
}

fn positive_or(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("Ignoring {} {}, using {}", name, value, fallback);
        fallback
    }
}

/// Startup view above the default coordinates. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeView {
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
}

impl Default for HomeView {
    fn default() -> Self {
        Self {
            height: HOME_VIEW_HEIGHT,
            heading: DEFAULT_HEADING,
            pitch: HOME_VIEW_PITCH_DEGREES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub enabled: bool,
    pub extent: f32,
    pub spacing: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            extent: GRID_EXTENT_METRES,
            spacing: GRID_SPACING_METRES,
        }
    }
}

impl GridSettings {
    /// Positive finite sizes with a bounded number of lines.
    pub fn is_buildable(&self) -> bool {
        let sizes_ok = self.extent.is_finite()
            && self.spacing.is_finite()
            && self.extent > 0.0
            && self.spacing > 0.0;
        sizes_ok && 2.0 * self.extent.max(self.spacing) / self.spacing <= GRID_MAX_LINES
    }
}

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<ViewerSettings>>,
}

pub fn start_settings_load(mut loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(SETTINGS_PATH));
}

/// Wait for the settings file, apply it (or the defaults) and start running.
pub fn finish_settings_load(
    loader: Res<SettingsLoader>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<ViewerSettings>>,
    mut settings: ResMut<ViewerSettings>,
    mut controller: ResMut<ModelController>,
    mut origin: ResMut<SceneOrigin>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = &loader.handle else {
        return;
    };

    let loaded = match asset_server.load_state(handle.id()) {
        LoadState::Loaded => settings_assets
            .get(handle)
            .cloned()
            .map(ViewerSettings::validated),
        LoadState::Failed(error) => {
            warn!("Using default viewer settings: {}", error);
            Some(ViewerSettings::default())
        }
        _ => None,
    };
    let Some(loaded) = loaded else {
        return;
    };

    info!(
        "Viewer settings ready, default position {:.7}, {:.7}",
        loaded.default_coordinates.longitude, loaded.default_coordinates.latitude
    );

    controller.configure(loaded.default_coordinates, loaded.fly_to);
    *origin = SceneOrigin::at(ground_anchor(&loaded.default_coordinates), *origin.ellipsoid());

    let home = Cartographic::from_degrees(
        loaded.default_coordinates.longitude,
        loaded.default_coordinates.latitude,
        loaded.home_view.height,
    );
    viewport_camera.fly_to(
        origin.cartographic_to_local(&home),
        loaded.home_view.heading.to_radians() as f32,
        loaded.home_view.pitch.to_radians() as f32,
    );
    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = viewport_camera.focus_point;
        transform.rotation = viewport_camera.view_rotation();
    }

    *settings = loaded;
    next_state.set(AppState::Running);
}

/// Origin anchor for a placement: same longitude and latitude, on the ellipsoid.
pub fn ground_anchor(coordinates: &Coordinates) -> Cartographic {
    Cartographic::from_degrees(coordinates.longitude, coordinates.latitude, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: ViewerSettings = serde_json::from_str(
            r#"{"grid": {"enabled": false}, "home_view": {"height": 250.0}}"#,
        )
        .unwrap();

        assert!(!settings.grid.enabled);
        assert_eq!(settings.grid.spacing, GRID_SPACING_METRES);
        assert_eq!(settings.home_view.height, 250.0);
        assert_eq!(settings.home_view.pitch, HOME_VIEW_PITCH_DEGREES);
        assert_eq!(settings.default_coordinates, Coordinates::default());
        assert_eq!(settings.marker_pixel_size, MARKER_PIXEL_SIZE);
    }

    #[test]
    fn test_shipped_settings_file_parses() {
        let settings: ViewerSettings =
            serde_json::from_str(include_str!("../../../assets/viewer_settings.json")).unwrap();
        assert_eq!(settings, ViewerSettings::default());
    }

    #[test]
    fn test_zero_grid_spacing_falls_back_to_defaults() {
        let settings: ViewerSettings = serde_json::from_str(
            r#"{"grid": {"enabled": false, "spacing": 0}, "marker_pixel_size": -4}"#,
        )
        .unwrap();
        let settings = settings.validated();

        assert_eq!(
            settings.grid,
            GridSettings {
                enabled: false,
                ..GridSettings::default()
            }
        );
        assert_eq!(settings.marker_pixel_size, MARKER_PIXEL_SIZE);
    }

    #[test]
    fn test_grid_needs_positive_bounded_sizes() {
        let grid = |extent: f32, spacing: f32| GridSettings {
            enabled: true,
            extent,
            spacing,
        };

        assert!(GridSettings::default().is_buildable());
        assert!(grid(10.0, 50.0).is_buildable());
        assert!(!grid(2000.0, -100.0).is_buildable());
        assert!(!grid(-2000.0, 100.0).is_buildable());
        assert!(!grid(f32::INFINITY, 100.0).is_buildable());
        assert!(!grid(2000.0, f32::NAN).is_buildable());
        assert!(!grid(1.0e9, 1.0).is_buildable());
    }

    #[test]
    fn test_ground_anchor_drops_height() {
        let coordinates = Coordinates {
            height: 120.0,
            ..Coordinates::default()
        };
        let anchor = ground_anchor(&coordinates);
        assert_eq!(anchor.height, 0.0);
        assert!((anchor.longitude_degrees() - coordinates.longitude).abs() < 1e-12);
    }
}
