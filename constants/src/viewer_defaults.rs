/// Default placement form values.
pub const DEFAULT_LONGITUDE: f64 = -71.0349999;
pub const DEFAULT_LATITUDE: f64 = 42.213;
pub const DEFAULT_HEIGHT: f64 = 0.0;
pub const DEFAULT_HEADING: f64 = 0.0;
pub const DEFAULT_PITCH: f64 = 0.0;
pub const DEFAULT_ROLL: f64 = 0.0;
pub const DEFAULT_SCALE: f64 = 1.0;

/// Initial camera view above the default coordinates.
pub const HOME_VIEW_HEIGHT: f64 = 1000.0;
pub const HOME_VIEW_PITCH_DEGREES: f64 = -45.0;

/// Camera placement after a model finishes loading.
pub const FLY_TO_HEIGHT_OFFSET: f64 = 100.0;
pub const FLY_TO_PITCH_DEGREES: f64 = -30.0;

/// Only files with this extension (case-insensitive) reach the loader.
pub const MODEL_FILE_EXTENSION: &str = "glb";

/// In-memory asset source that holds uploaded model bytes.
pub const MODEL_SOURCE_ID: &str = "models";

/// Optional settings file, relative to the asset root.
pub const SETTINGS_PATH: &str = "viewer_settings.json";

/// Log filter passed to Bevy's log plugin.
pub const LOG_FILTER: &str = "wgpu=error,naga=warn,bevy_render=warn,globe_model_viewer=info";
