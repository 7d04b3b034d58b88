use bevy::color::Color;

/// Diameter of measurement markers on screen.
pub const MARKER_PIXEL_SIZE: f32 = 10.0;

/// Width of measurement polylines on screen.
pub const LINE_PIXEL_WIDTH: f32 = 3.0;

/// Label text size.
pub const LABEL_FONT_SIZE: f32 = 14.0;

/// Vertical offset of labels placed above a marker (negative is up).
pub const LABEL_PIXEL_OFFSET: f32 = -10.0;

pub const POINT_MARKER_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);
pub const DISTANCE_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);
pub const AREA_COLOUR: Color = Color::srgb(0.0, 0.5, 0.0);
pub const AREA_FILL_ALPHA: f32 = 0.3;
pub const LABEL_COLOUR: Color = Color::WHITE;

/// Ground grid appearance.
pub const GRID_COLOUR: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);
pub const GRID_EXTENT_METRES: f32 = 2000.0;
pub const GRID_SPACING_METRES: f32 = 100.0;
/// Upper bound on grid lines per axis.
pub const GRID_MAX_LINES: f32 = 1000.0;

/// Camera clip planes. The far plane has to cover a 1 km altitude view of
/// the horizon.
pub const CAMERA_NEAR: f32 = 0.5;
pub const CAMERA_FAR: f32 = 2.0e6;
