//! WebSocket connection establishment.
//!
//! [`Client`] holds the URLs for one ComfyUI server. Call
//! [`Client::connect`] before submitting a workflow so that no
//! completion message can arrive while the socket is still down.

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Raw WebSocket stream type used throughout the crate.
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for a single ComfyUI server.
pub struct Client {
    ws_url: String,
    api_url: String,
}

/// A live WebSocket connection plus the client id it was opened with.
///
/// The same `client_id` must be sent with the workflow submission so
/// that the server routes execution messages to this socket.
pub struct Connection {
    /// UUID v4 sent as the `clientId` query parameter.
    pub client_id: String,
    /// The raw WebSocket stream for reading frames.
    pub ws_stream: WsStream,
}

impl Client {
    /// Create a client from explicit WebSocket and HTTP base URLs.
    pub fn new(ws_url: String, api_url: String) -> Self {
        Self { ws_url, api_url }
    }

    /// Create a client from a bare `host:port` server address.
    pub fn from_address(address: &str) -> Self {
        Self {
            ws_url: format!("ws://{address}"),
            api_url: format!("http://{address}"),
        }
    }

    /// HTTP API base URL (e.g. `http://host:8188`).
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// WebSocket base URL (e.g. `ws://host:8188`).
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Open the WebSocket connection.
    ///
    /// Generates a fresh client id and appends it as the `clientId`
    /// query parameter; the server addresses execution messages for
    /// our submissions to this id.
    pub async fn connect(&self) -> Result<Connection, ClientError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/ws?clientId={}", self.ws_url, client_id);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            ClientError::Connection(format!("failed to connect to {}: {e}", self.ws_url))
        })?;

        tracing::info!(client_id = %client_id, "Connected to ComfyUI at {}", self.ws_url);

        Ok(Connection {
            client_id,
            ws_stream,
        })
    }
}

/// Errors from WebSocket connection establishment.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Failed to establish the initial WebSocket connection.
    #[error("connection error: {0}")]
    Connection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_address_builds_both_urls() {
        let client = Client::from_address("127.0.0.1:8188");
        assert_eq!(client.ws_url(), "ws://127.0.0.1:8188");
        assert_eq!(client.api_url(), "http://127.0.0.1:8188");
    }

    #[tokio::test]
    async fn connect_to_unreachable_server_fails() {
        let client = Client::from_address("127.0.0.1:1");
        let err = client.connect().await.err().expect("should not connect");
        assert!(matches!(err, ClientError::Connection(_)));
    }
}
