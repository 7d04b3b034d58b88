//! Shared constants for the globe model viewer.
//!
//! Geodetic parameters, axis conventions, viewer defaults and render
//! settings live here so the application crate and its tests agree on
//! the same numbers.

/// Axis conventions between the fixed (ECEF/ENU) frames and Bevy's Y-up world.
pub mod coordinate_system;

/// WGS84 ellipsoid parameters and numeric tolerances.
pub mod geodesy;

/// Marker, line and label appearance.
pub mod render_settings;

/// Default form values, camera views and asset paths.
pub mod viewer_defaults;
