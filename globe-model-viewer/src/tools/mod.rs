//! Measuring tools and their coordination.
//!
//! ## Tool Activation Flow
//!
//! ```text
//! Keyboard/RPC Input
//!   └─> ToolSelectionEvent
//!       └─> handle_tool_selection_events()
//!           ├─> Reject unless a model is loaded
//!           ├─> Clear the measurement session
//!           └─> Start the requested tool, show its instructions
//! ```
//!
//! `sync_tool_state` announces availability and the active tool to the
//! host page whenever either changes.
//!
//! ## Available Tools
//!
//! - **Point** (`P` native, `"point"` over RPC): one click, one marker with
//!   its longitude, latitude and height.
//! - **Distance** (`K`, `"distance"`): two clicks, straight-line distance
//!   with a live readout after the first.
//! - **Area** (`G`, `"area"`): any number of clicks, geodesic area of the
//!   closed polygon, updated on each vertex.
//!
//! `Escape` on native builds and `clear_tool` over RPC remove every
//! measurement and end the tool.

/// Measurement session, geometry and pointer routing.
pub mod measure;

/// Tool availability, selection events and page notifications.
pub mod tool_manager;
