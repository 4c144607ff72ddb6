//! ComfyUI fetch client library.
//!
//! Implements the client side of the ComfyUI submit/wait/retrieve
//! sequence: queue a workflow over HTTP, watch the WebSocket for the
//! completion signal, enumerate the media the server produced, and
//! download each item to disk.

pub mod api;
pub mod client;
pub mod manifest;
pub mod messages;
pub mod monitor;
pub mod outputs;
pub mod saver;
