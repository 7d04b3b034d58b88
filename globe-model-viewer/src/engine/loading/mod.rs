//! Asset loading for settings and uploaded models.
//!
//! Settings load once during `AppState::Loading`; models arrive at any time
//! through the in-memory asset source and are polled until they settle.

/// In-memory `models://` asset source for uploaded bytes.
pub mod memory_source;

/// Pending glTF loads, completion reporting and node tagging.
pub mod model_loader;

/// `ViewerSettings` asset with compiled defaults.
pub mod settings_loader;
