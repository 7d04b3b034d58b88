use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::core::app_state::AppState;
use crate::model::coordinates::{CoordinateForm, Coordinates};
use crate::model::lifecycle::ModelController;
use crate::model::systems::ModelCommand;
use crate::tools::tool_manager::{
    ClearToolEvent, ToolSelectionEvent, ToolSelectionSource, ToolType,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Error)]
#[error("{message} ({code})")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;

    pub fn parse_error(message: &str) -> Self {
        Self {
            code: Self::PARSE_ERROR,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: Self::INVALID_REQUEST,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC communication with the host page.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the postMessage communication layer for iframe embedding.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            // Messages wait in the queue until settings are applied.
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .run_if(in_state(AppState::Running)),
            )
            .add_systems(PostUpdate, send_outgoing_messages);

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Shared queue between the JS callback and the ECS.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Only string payloads carry RPC messages.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Ownership moves to JS so the callback outlives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping the message queue filled by the JS callback.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw message received from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Work an accepted request asks the viewer to do.
#[derive(Debug)]
enum RpcAction {
    Model(ModelCommand),
    SelectTool(ToolType),
    ClearTool,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    controller: Res<ModelController>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut model_commands: EventWriter<ModelCommand>,
    mut tool_events: EventWriter<ToolSelectionEvent>,
    mut clear_events: EventWriter<ClearToolEvent>,
) {
    for event in events.read() {
        let defaults = controller.default_coordinates();
        let (response, action) = respond_to_message(&event.content, &defaults);

        match action {
            Some(RpcAction::Model(command)) => {
                model_commands.write(command);
            }
            Some(RpcAction::SelectTool(tool_type)) => {
                tool_events.write(ToolSelectionEvent {
                    tool_type,
                    source: ToolSelectionSource::Rpc,
                });
            }
            Some(RpcAction::ClearTool) => {
                clear_events.write(ClearToolEvent {
                    source: ToolSelectionSource::Rpc,
                });
            }
            None => {}
        }

        if let Some(response) = response {
            rpc_interface.queue_response(response);
        }
    }
}

/// Parse and route one raw message. Notifications (no id) get no response.
fn respond_to_message(
    content: &str,
    defaults: &Coordinates,
) -> (Option<RpcResponse>, Option<RpcAction>) {
    let request = match serde_json::from_str::<RpcRequest>(content) {
        Ok(request) => request,
        Err(parse_error) => {
            warn!("Unreadable RPC message: {}", parse_error);
            let error = if parse_error.is_data() {
                RpcError::invalid_request(&parse_error.to_string())
            } else {
                RpcError::parse_error(&parse_error.to_string())
            };
            return (Some(error_response(None, error)), None);
        }
    };

    if request.jsonrpc != "2.0" {
        warn!("Unsupported JSON-RPC version {:?}", request.jsonrpc);
        let error = RpcError::invalid_request(&format!(
            "Unsupported JSON-RPC version: {}",
            request.jsonrpc
        ));
        return (request.id.map(|id| error_response(Some(id), error)), None);
    }

    debug!("Processing RPC method: {}", request.method);
    let (response, action) = match handle_rpc_request(&request, defaults) {
        Ok((result, action)) => (
            RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id: request.id.clone(),
            },
            action,
        ),
        Err(error) => {
            warn!("RPC {} rejected: {}", request.method, error);
            (error_response(request.id.clone(), error), None)
        }
    };

    (request.id.is_some().then_some(response), action)
}

/// Route a request to its handler. Returns the result payload and any work to do.
fn handle_rpc_request(
    request: &RpcRequest,
    defaults: &Coordinates,
) -> Result<(serde_json::Value, Option<RpcAction>), RpcError> {
    let accepted = serde_json::json!({ "accepted": true });

    let action = match request.method.as_str() {
        "select_model_file" => handle_select_model_file(&request.params)?,
        "load_model" => RpcAction::Model(ModelCommand::Load(coordinates_param(&request.params)?)),
        "apply_position" => {
            RpcAction::Model(ModelCommand::ApplyPosition(coordinates_param(&request.params)?))
        }
        "reset_position" => {
            return Ok((
                serde_json::json!({ "accepted": true, "coordinates": defaults }),
                Some(RpcAction::Model(ModelCommand::ResetPosition)),
            ));
        }
        "clear_model" => RpcAction::Model(ModelCommand::Clear),
        "tool_selection" => handle_tool_selection(&request.params)?,
        "clear_tool" => RpcAction::ClearTool,
        "get_default_coordinates" => {
            return Ok((serde_json::json!({ "coordinates": defaults }), None));
        }
        _ => return Err(RpcError::method_not_found(&request.method)),
    };

    info!("RPC {} accepted", request.method);
    Ok((accepted, Some(action)))
}

/// Decode a file upload. `data` is base64, optionally as a data URL.
fn handle_select_model_file(params: &serde_json::Value) -> Result<RpcAction, RpcError> {
    #[derive(Deserialize)]
    struct SelectFileParams {
        file_name: String,
        data: String,
    }

    let file_params = serde_json::from_value::<SelectFileParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'file_name' and 'data' parameters"))?;

    let encoded = match file_params.data.split_once("base64,") {
        Some((_, payload)) => payload,
        None => file_params.data.as_str(),
    };
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|error| RpcError::invalid_params(&format!("Invalid base64 data: {error}")))?;

    Ok(RpcAction::Model(ModelCommand::SelectFile {
        file_name: file_params.file_name,
        bytes: Arc::new(bytes),
    }))
}

fn coordinates_param(params: &serde_json::Value) -> Result<CoordinateForm, RpcError> {
    #[derive(Deserialize)]
    struct CoordinateParams {
        coordinates: CoordinateForm,
    }

    serde_json::from_value::<CoordinateParams>(params.clone())
        .map(|parsed| parsed.coordinates)
        .map_err(|_| RpcError::invalid_params("Expected 'coordinates' parameter"))
}

/// Handle tool selection RPC method with parameter validation.
fn handle_tool_selection(params: &serde_json::Value) -> Result<RpcAction, RpcError> {
    #[derive(Deserialize)]
    struct ToolSelectionParams {
        tool: String,
    }

    let tool_params = serde_json::from_value::<ToolSelectionParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'tool' parameter"))?;

    let tool_type = ToolType::from_string(&tool_params.tool)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown tool: {}", tool_params.tool)))?;

    Ok(RpcAction::SelectTool(tool_type))
}

fn error_response(id: Option<serde_json::Value>, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(error),
        id,
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Notifications first so panels are current when a response arrives.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}
