//! JSON-RPC 2.0 communication layer for the embedding page.
//!
//! The web build runs inside an iframe; the page drives it over
//! `postMessage`, and the viewer reports back with notifications.
//!
//! ## Message Flow
//!
//! ```text
//! Page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Validate, queue event
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Requests are acknowledged with `{"accepted": true}` once validated and
//! queued. Outcomes, including user errors, arrive as panel notifications.
//!
//! ## Requests
//!
//! - `select_model_file {file_name, data}`: `data` is base64 (a data URL is fine)
//! - `load_model {coordinates}`: place the selected file
//! - `apply_position {coordinates}`: move the loaded model
//! - `reset_position`: result carries the default `coordinates`
//! - `clear_model`
//! - `tool_selection {tool}`: `point`, `distance` or `area`
//! - `clear_tool`
//! - `get_default_coordinates`
//!
//! `coordinates` holds `longitude`, `latitude`, `height`, `heading`,
//! `pitch`, `roll` and `scale`, as numbers or as the text typed in a form.
//!
//! ## Notifications
//!
//! - `model_info_changed {html, text}`
//! - `measurement_info_changed {html, text}`
//! - `measuring_tools_changed {enabled}`
//! - `tool_state_changed {tool, active}`
//! - `model_load_state {state, generation}`
//! - `viewer_ready`: settings applied, requests are being handled
//!
//! ## Error Handling
//!
//! - `-32700`: Parse error
//! - `-32601`: Method not found
//! - `-32602`: Invalid params

/// postMessage listener, request routing and outgoing message queue.
pub mod web_rpc;
