//! HTTP wrappers for the ComfyUI REST endpoints.
//!
//! Covers the three calls the fetch sequence needs: workflow
//! submission (`POST /prompt`), history retrieval
//! (`GET /history/{prompt_id}`), and media download (`GET /view`).

use serde::Deserialize;

/// HTTP client for one ComfyUI server.
pub struct ComfyApi {
    client: reqwest::Client,
    api_url: String,
}

/// Response from `POST /prompt` after the workflow was queued.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued prompt.
    pub prompt_id: String,
    /// Position in the execution queue.
    pub number: i32,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("ComfyUI API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ComfyApi {
    /// Create an API client for the given base URL (e.g. `http://host:8188`).
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Queue a workflow for execution.
    ///
    /// The `client_id` must match the one used for the WebSocket
    /// handshake, otherwise the completion messages go elsewhere.
    pub async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        client_id: &str,
    ) -> Result<SubmitResponse, ApiError> {
        let body = serde_json::json!({
            "prompt": workflow,
            "client_id": client_id,
        });

        let response = self
            .client
            .post(format!("{}/prompt", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Retrieve the execution history entry for a prompt.
    ///
    /// The returned JSON is keyed by prompt id and contains the
    /// per-node `outputs` with the media file references.
    pub async fn history(&self, prompt_id: &str) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .get(format!("{}/history/{}", self.api_url, prompt_id))
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Download one media item from the server's output store.
    ///
    /// Sends `GET /view` with the filename, subfolder, and folder type
    /// exactly as they appear in the history outputs.
    pub async fn fetch_media(
        &self,
        filename: &str,
        subfolder: &str,
        folder_type: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(format!("{}/view", self.api_url))
            .query(&[
                ("filename", filename),
                ("subfolder", subfolder),
                ("type", folder_type),
            ])
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Return the response unchanged on a 2xx status, or an
    /// [`ApiError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
