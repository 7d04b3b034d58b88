use bevy::prelude::*;

use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Waiting for viewer settings.
    #[default]
    Loading,
    Running,
}

pub fn announce_ready(mut rpc_interface: ResMut<WebRpcInterface>) {
    info!("Viewer ready");
    rpc_interface.send_notification("viewer_ready", serde_json::json!({}));
}
