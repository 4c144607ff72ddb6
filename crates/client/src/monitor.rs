//! Drive the WebSocket until a submitted prompt completes.
//!
//! Reads frames from the connection, parses them via
//! [`parse_message`], and returns once the server reports the prompt
//! finished (`executing` with `node: null`) or failed. Binary preview
//! frames sent while the dedicated WebSocket save node is executing
//! are collected and returned to the caller.

use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use crate::client::WsStream;
use crate::messages::{
    parse_message, ErrorData, PreviewFrame, ServerMessage, WEBSOCKET_SAVE_NODE,
};

/// Errors that can end the wait before the prompt completes.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The server reported an execution error for our prompt.
    #[error("execution failed in node {node_id} ({exception_type}): {message}")]
    Execution {
        node_id: String,
        exception_type: String,
        message: String,
    },

    /// The WebSocket closed before the completion message arrived.
    #[error("connection closed before execution completed")]
    ConnectionClosed,

    /// A transport-level receive error on the WebSocket.
    #[error("WebSocket receive error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Block until `prompt_id` finishes executing on the server.
///
/// Returns the preview frames the server pushed into the connection
/// for the WebSocket save node, in arrival order. Frames belonging to
/// other prompts and unparseable messages are skipped.
pub async fn wait_for_completion(
    ws_stream: &mut WsStream,
    prompt_id: &str,
) -> Result<Vec<PreviewFrame>, MonitorError> {
    let mut previews = Vec::new();
    let mut current_node: Option<String> = None;

    while let Some(frame) = ws_stream.next().await {
        match frame? {
            Message::Text(text) => {
                match parse_message(&text) {
                    Ok(msg) => {
                        if handle_message(msg, prompt_id, &mut current_node)? {
                            return Ok(previews);
                        }
                    }
                    Err(e) => {
                        // Custom nodes broadcast their own message kinds; skip them.
                        tracing::debug!(error = %e, raw = %text, "Skipping unrecognized message");
                    }
                }
            }
            Message::Binary(data) => {
                if current_node.as_deref() == Some(WEBSOCKET_SAVE_NODE) {
                    match PreviewFrame::parse(&data) {
                        Some(frame) => previews.push(frame),
                        None => {
                            tracing::warn!(len = data.len(), "Discarding malformed preview frame");
                        }
                    }
                }
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Handled automatically by tungstenite.
            }
            Message::Close(frame) => {
                tracing::info!(?frame, "ComfyUI WebSocket closed");
                return Err(MonitorError::ConnectionClosed);
            }
            Message::Frame(_) => {}
        }
    }

    Err(MonitorError::ConnectionClosed)
}

/// Interpret one parsed message against the prompt we are waiting on.
///
/// Returns `Ok(true)` when the prompt finished, `Ok(false)` to keep
/// waiting, and `Err` when the prompt failed.
fn handle_message(
    msg: ServerMessage,
    prompt_id: &str,
    current_node: &mut Option<String>,
) -> Result<bool, MonitorError> {
    match msg {
        ServerMessage::Executing(data) if data.prompt_id == prompt_id => {
            match data.node {
                Some(node) => {
                    tracing::debug!(node = %node, "Executing node");
                    *current_node = Some(node);
                    Ok(false)
                }
                None => {
                    tracing::info!(prompt_id = %data.prompt_id, "Execution completed");
                    Ok(true)
                }
            }
        }
        ServerMessage::ExecutionError(data) if data.prompt_id == prompt_id => {
            Err(execution_error(data))
        }
        ServerMessage::ExecutionStart(data) if data.prompt_id == prompt_id => {
            tracing::info!(prompt_id = %data.prompt_id, "Execution started");
            Ok(false)
        }
        ServerMessage::ExecutionCached(data) if data.prompt_id == prompt_id => {
            tracing::debug!(cached_nodes = data.nodes.len(), "Nodes served from cache");
            Ok(false)
        }
        ServerMessage::Progress(data) => {
            tracing::debug!(value = data.value, max = data.max, "Generation progress");
            Ok(false)
        }
        ServerMessage::Executed(data) if data.prompt_id == prompt_id => {
            tracing::debug!(node = %data.node, "Node produced output");
            Ok(false)
        }
        ServerMessage::Status(data) => {
            tracing::debug!(
                queue_remaining = data.status.exec_info.queue_remaining,
                "Queue status",
            );
            Ok(false)
        }
        // Messages for other prompts on a shared server.
        _ => Ok(false),
    }
}

fn execution_error(data: ErrorData) -> MonitorError {
    tracing::error!(
        prompt_id = %data.prompt_id,
        node_id = %data.node_id,
        error_type = %data.exception_type,
        error_message = %data.exception_message,
        "Execution error",
    );
    MonitorError::Execution {
        node_id: data.node_id,
        exception_type: data.exception_type,
        message: data.exception_message,
    }
}
