use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{UserInputError, ViewerError};
use crate::model::lifecycle::ModelController;
use crate::panels::view::{InfoPanels, ModelInfoBlock};
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::measure::session::MeasurementSession;
use crate::engine::scene::backend::BevyScene;

/// Enumeration of available measurement tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Point,
    Distance,
    Area,
}

impl ToolType {
    /// Convert string identifier to tool type for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "point" => Some(Self::Point),
            "distance" => Some(Self::Distance),
            "area" => Some(Self::Area),
            _ => None,
        }
    }

    /// Convert tool type to string identifier for frontend communication.
    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Distance => "distance",
            Self::Area => "area",
        }
    }
}

/// Resource tracking whether tools may be used and which tool the page was last told about.
///
/// The measurement session owns the live mode; this only mirrors it so that
/// changes can be announced once.
#[derive(Resource, Default)]
pub struct ToolManager {
    enabled: bool,
    announced_tool: Option<ToolType>,
}

impl ToolManager {
    /// Returns true when availability changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        info!(
            "Measuring tools {}",
            if enabled { "enabled" } else { "disabled" }
        );
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record the session's current tool. Returns the change to announce, if any.
    pub fn observe_active_tool(&mut self, active: Option<ToolType>) -> Option<ToolChange> {
        if self.announced_tool == active {
            return None;
        }

        let change = match (self.announced_tool, active) {
            (_, Some(tool)) => ToolChange {
                tool,
                active: true,
            },
            (Some(previous), None) => ToolChange {
                tool: previous,
                active: false,
            },
            (None, None) => return None,
        };
        self.announced_tool = active;
        Some(change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolChange {
    pub tool: ToolType,
    pub active: bool,
}

/// Event fired when tool selection changes via RPC or keyboard shortcuts.
#[derive(Event)]
pub struct ToolSelectionEvent {
    pub tool_type: ToolType,
    pub source: ToolSelectionSource,
}

/// Event fired to end the current tool and wipe its measurements.
#[derive(Event)]
pub struct ClearToolEvent {
    pub source: ToolSelectionSource,
}

/// Source of tool selection for debugging and conditional logic.
#[derive(Debug, Clone, Copy)]
pub enum ToolSelectionSource {
    Rpc,
    Keyboard,
}

/// System handling tool selection events. A new tool always starts from an empty session.
pub fn handle_tool_selection_events(
    mut events: EventReader<ToolSelectionEvent>,
    tool_manager: Res<ToolManager>,
    mut session: ResMut<MeasurementSession>,
    mut panels: ResMut<InfoPanels>,
    mut scene: BevyScene,
) {
    for event in events.read() {
        if !tool_manager.is_enabled() {
            let error = ViewerError::from(UserInputError::NothingToMeasure);
            warn!("Ignoring {:?} tool request: {}", event.tool_type, error);
            panels.show_model(ModelInfoBlock::Error(error.panel_message()));
            continue;
        }

        let readout = session.start(event.tool_type, &mut scene);
        panels.show_measurement(readout);
        info!(
            "{} tool activated via {:?}",
            event.tool_type.to_string(),
            event.source
        );
    }
}

/// System clearing measurements on request.
pub fn handle_clear_tool_events(
    mut events: EventReader<ClearToolEvent>,
    mut session: ResMut<MeasurementSession>,
    mut panels: ResMut<InfoPanels>,
    mut scene: BevyScene,
) {
    for event in events.read() {
        let readout = session.clear(&mut scene);
        panels.show_measurement(readout);
        info!("Measurements cleared via {:?}", event.source);
    }
}

/// Keep tool availability tied to the model state and tell the page about changes.
pub fn sync_tool_state(
    controller: Res<ModelController>,
    session: Res<MeasurementSession>,
    mut tool_manager: ResMut<ToolManager>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if tool_manager.set_enabled(controller.is_loaded()) {
        rpc_interface.send_notification(
            "measuring_tools_changed",
            serde_json::json!({ "enabled": tool_manager.is_enabled() }),
        );
    }

    if let Some(change) = tool_manager.observe_active_tool(session.mode()) {
        rpc_interface.send_notification(
            "tool_state_changed",
            serde_json::json!({
                "tool": change.tool.to_string(),
                "active": change.active
            }),
        );
    }
}

/// System handling keyboard shortcuts for tool selection (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tool_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tool_events: EventWriter<ToolSelectionEvent>,
    mut clear_events: EventWriter<ClearToolEvent>,
) {
    let shortcuts = [
        (KeyCode::KeyP, ToolType::Point),
        (KeyCode::KeyK, ToolType::Distance),
        (KeyCode::KeyG, ToolType::Area),
    ];

    for (key, tool_type) in shortcuts {
        if keyboard.just_pressed(key) {
            tool_events.write(ToolSelectionEvent {
                tool_type,
                source: ToolSelectionSource::Keyboard,
            });
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        clear_events.write(ClearToolEvent {
            source: ToolSelectionSource::Keyboard,
        });
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_tool_keyboard_shortcuts() {
    // Tools are driven by the host page over RPC.
}
