//! The single model slot: placement input, the GLB file, its lifecycle and
//! what the inspector can say about its parts.

/// Placement values, form validation and the model-to-fixed transform.
pub mod coordinates;

/// Selected file bytes and size formatting.
pub mod file;

/// GLB container header and the node table read from its JSON chunk.
pub mod glb;

/// Element descriptions and node-name matching for spawned entities.
pub mod inspector;

/// `ModelController` and the `ModelStage` seam to the engine.
pub mod lifecycle;

/// Model command events and state announcements.
pub mod systems;
