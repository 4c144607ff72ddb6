//! Typed parsing for ComfyUI WebSocket frames.
//!
//! Text frames are JSON of the shape `{"type": "<kind>", "data": {...}}`
//! and deserialize into [`ServerMessage`]. Binary frames carry preview
//! images with an 8-byte header and parse into [`PreviewFrame`].

use serde::Deserialize;

/// The node id ComfyUI uses for outputs saved directly into the
/// WebSocket connection instead of the history.
pub const WEBSOCKET_SAVE_NODE: &str = "save_image_websocket_node";

/// All known ComfyUI WebSocket text message kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Server status broadcast (queue depth, etc.).
    #[serde(rename = "status")]
    Status(StatusData),

    /// A prompt has started executing.
    #[serde(rename = "execution_start")]
    ExecutionStart(PromptRef),

    /// Some nodes were skipped because their outputs are cached.
    #[serde(rename = "execution_cached")]
    ExecutionCached(CachedData),

    /// A node is executing; `node: null` means the prompt finished.
    #[serde(rename = "executing")]
    Executing(ExecutingData),

    /// Step-level progress from a long-running node.
    #[serde(rename = "progress")]
    Progress(ProgressData),

    /// A node finished and produced output.
    #[serde(rename = "executed")]
    Executed(ExecutedData),

    /// Execution failed with an error.
    #[serde(rename = "execution_error")]
    ExecutionError(ErrorData),
}

/// Queue status information.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusData {
    pub status: QueueStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueStatus {
    pub exec_info: ExecInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecInfo {
    pub queue_remaining: i32,
}

/// Payload carrying only a prompt id (`execution_start`).
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRef {
    pub prompt_id: String,
}

/// Payload for `execution_cached` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct CachedData {
    pub prompt_id: String,
    /// Node ids whose outputs were served from cache.
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// Payload for `executing` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutingData {
    /// `None` once every node of the prompt has run.
    pub node: Option<String>,
    pub prompt_id: String,
}

/// Payload for `progress` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressData {
    /// Current step number.
    pub value: i32,
    /// Total number of steps.
    pub max: i32,
}

/// Payload for `executed` messages (per-node output).
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutedData {
    pub node: String,
    /// Raw output value (file references, etc.).
    pub output: serde_json::Value,
    pub prompt_id: String,
}

/// Payload for `execution_error` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorData {
    pub prompt_id: String,
    pub node_id: String,
    pub exception_message: String,
    pub exception_type: String,
}

/// Parse a text frame into a typed [`ServerMessage`].
///
/// Returns `Err` for malformed JSON or unknown `type` values; the
/// monitor logs those and keeps reading.
pub fn parse_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

// ---------------------------------------------------------------------------
// Binary preview frames
// ---------------------------------------------------------------------------

/// Length of the binary frame header: event type (u32 BE) followed by
/// image format (u32 BE).
const PREVIEW_HEADER_LEN: usize = 8;

/// Image encoding of a binary preview frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFormat {
    Jpeg,
    Png,
}

impl PreviewFormat {
    /// File extension to use when writing the frame to disk.
    pub fn extension(self) -> &'static str {
        match self {
            PreviewFormat::Jpeg => "jpeg",
            PreviewFormat::Png => "png",
        }
    }
}

/// A decoded binary preview frame: the encoded image bytes with the
/// transport header stripped.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub format: PreviewFormat,
    pub data: Vec<u8>,
}

impl PreviewFrame {
    /// Strip the 8-byte header from a binary frame.
    ///
    /// Returns `None` for frames that are too short or carry an
    /// unknown image format code.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < PREVIEW_HEADER_LEN {
            return None;
        }
        let format = match u32::from_be_bytes(frame[4..8].try_into().ok()?) {
            1 => PreviewFormat::Jpeg,
            2 => PreviewFormat::Png,
            _ => return None,
        };
        Some(Self {
            format,
            data: frame[PREVIEW_HEADER_LEN..].to_vec(),
        })
    }
}
