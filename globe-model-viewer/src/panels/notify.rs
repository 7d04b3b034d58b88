use bevy::prelude::*;

use super::view::InfoPanels;
use crate::rpc::web_rpc::WebRpcInterface;

/// Last panel content sent to the page.
#[derive(Default)]
pub struct AnnouncedPanels {
    model_html: Option<String>,
    measurement_html: Option<String>,
}

/// Push panel content to the page when its rendering actually changed.
pub fn announce_panel_changes(
    panels: Res<InfoPanels>,
    mut announced: Local<AnnouncedPanels>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !panels.is_changed() {
        return;
    }

    let model_html = panels.model_html();
    if announced.model_html.as_ref() != Some(&model_html) {
        rpc_interface.send_notification(
            "model_info_changed",
            serde_json::json!({ "html": model_html, "text": panels.model_text() }),
        );
        announced.model_html = Some(model_html);
    }

    let measurement_html = panels.measurement().to_html();
    if announced.measurement_html.as_ref() != Some(&measurement_html) {
        rpc_interface.send_notification(
            "measurement_info_changed",
            serde_json::json!({
                "html": measurement_html,
                "text": panels.measurement().to_plain_text()
            }),
        );
        announced.measurement_html = Some(measurement_html);
    }
}
