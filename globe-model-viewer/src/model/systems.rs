use std::sync::Arc;

use bevy::prelude::*;

use super::coordinates::CoordinateForm;
use super::lifecycle::{ModelController, ModelState};
use crate::engine::scene::backend::BevyScene;
use crate::error::ViewerError;
use crate::panels::view::InfoPanels;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::measure::session::MeasurementSession;

/// Requests from the host page for the model slot.
#[derive(Event, Debug, Clone)]
pub enum ModelCommand {
    SelectFile {
        file_name: String,
        bytes: Arc<Vec<u8>>,
    },
    Load(CoordinateForm),
    ApplyPosition(CoordinateForm),
    ResetPosition,
    Clear,
}

/// Apply model commands in arrival order. Failures are already on the panel.
pub fn handle_model_commands(
    mut commands: EventReader<ModelCommand>,
    mut controller: ResMut<ModelController>,
    mut session: ResMut<MeasurementSession>,
    mut panels: ResMut<InfoPanels>,
    mut scene: BevyScene,
) {
    for command in commands.read() {
        let result: Result<(), ViewerError> = match command {
            ModelCommand::SelectFile { file_name, bytes } => {
                controller.select_file(file_name.clone(), Arc::clone(bytes), &mut panels)
            }
            ModelCommand::Load(form) => controller
                .load(form.clone(), &mut scene, &mut session, &mut panels)
                .map(|_| ()),
            ModelCommand::ApplyPosition(form) => {
                controller.reposition(form.clone(), &mut scene, &mut panels)
            }
            ModelCommand::ResetPosition => {
                controller.reset_position(&mut scene, &mut panels);
                Ok(())
            }
            ModelCommand::Clear => {
                controller.clear(&mut scene, &mut session, &mut panels);
                Ok(())
            }
        };

        if let Err(error) = result {
            debug!("Model command rejected: {}", error);
        }
    }
}

/// Tell the page whenever the lifecycle state or generation moves.
pub fn announce_model_state(
    controller: Res<ModelController>,
    mut announced: Local<Option<(ModelState, Option<u64>)>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let current = (controller.state(), controller.current_generation());
    if *announced == Some(current) {
        return;
    }
    *announced = Some(current);

    rpc_interface.send_notification(
        "model_load_state",
        serde_json::json!({
            "state": current.0.as_str(),
            "generation": current.1,
        }),
    );
}
