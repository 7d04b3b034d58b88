//! Everything drawn in the 3D view.
//!
//! The floating origin that maps Earth-fixed coordinates into Bevy's `f32`
//! world, the ground grid, measurement visuals and world-anchored labels,
//! and the `BevyScene` adapter the model controller and measurement session
//! talk to.

/// `ModelStage` and `MeasurementCanvas` on top of Bevy commands and assets.
pub mod backend;

/// Surface-following grid around the scene origin.
pub mod grid;

/// Screen-space labels pinned to world positions.
pub mod labels;

/// Constant pixel-size markers and lines.
pub mod markers;

/// Floating origin between Earth-fixed and render coordinates.
pub mod origin;
