//! The model and measurement information panels.
//!
//! `view` holds the panel content as data with its HTML and plain-text
//! renderings. The page receives HTML through notifications; native builds
//! draw the plain text with Bevy UI.

/// Bevy UI text panels for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

/// Page notifications for panel changes.
pub mod notify;

/// Panel view-models and their renderings.
pub mod view;
