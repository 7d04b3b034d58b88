//! Point, distance and area measurement.
//!
//! `session` holds the picked points and the visuals made for them,
//! `geometry` the distance and area math with display formatting, and
//! `pointer` decides whether a scene click is a measurement or an
//! inspection.

pub mod geometry;
pub mod pointer;
pub mod session;
