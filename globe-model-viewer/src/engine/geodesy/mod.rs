//! WGS84 geodesy in double precision.
//!
//! Conversions between cartographic (longitude, latitude, height) and
//! Earth-fixed Cartesian coordinates, local east-north-up frames,
//! heading/pitch/roll orientation and ray intersection with the ellipsoid.
//!
//! Everything here is pure `f64` math on `glam` double types; the Bevy
//! world only sees the results after `SceneOrigin` rebases them to `f32`.

/// Ellipsoid model and cartographic conversions.
pub mod ellipsoid;

/// Local east-north-up frames and heading/pitch/roll orientation.
pub mod frames;

/// Ray intersection against the ellipsoid surface.
pub mod intersection;

pub use ellipsoid::{Cartographic, Ellipsoid};
pub use frames::{HeadingPitchRoll, east_north_up_to_fixed_frame, heading_pitch_roll_quaternion};
pub use intersection::ray_ellipsoid;

use bevy::math::DMat3;

/// Build a `DMat3` from a row-major table as stored in the constants crate.
pub fn mat3_from_rows(rows: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(rows).transpose()
}
