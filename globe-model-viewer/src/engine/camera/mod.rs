//! Viewport camera for navigating around a placed model.
//!
//! Eased position/yaw/pitch targets driven by mouse and keyboard, plus the
//! fly-to entry point used by the model lifecycle.

/// Viewport camera resource and controller system for scene navigation.
pub mod viewport_camera;
