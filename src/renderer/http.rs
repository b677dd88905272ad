//! HTTP renderer client.
//!
//! Posts the parameter set as JSON and expects `{"success": true, "path": ...}`
//! or `{"success": false, "error": ...}` back.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RenderRequest, Renderer, RendererError};
use crate::params::ParameterSet;

/// Request body sent to the renderer.
#[derive(Debug, Serialize)]
struct ManipulateRequest<'a> {
    audio_path: &'a str,
    #[serde(flatten)]
    parameters: &'a ParameterSet,
}

/// Response body returned by the renderer.
#[derive(Debug, Deserialize)]
struct ManipulateResponse {
    success: bool,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Renderer reached over HTTP.
pub struct HttpRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRenderer {
    /// Creates a client for `endpoint`. No timeout is applied unless one is given.
    ///
    /// # Errors
    /// - If the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RendererError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    /// URL the renderer posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &RenderRequest) -> Result<String, RendererError> {
        let body = ManipulateRequest {
            audio_path: &request.audio_path,
            parameters: &request.parameters,
        };

        tracing::debug!(
            "Renderer API Call:\n  URL: {}\n  Method: POST\n  Body: {}",
            self.endpoint,
            serde_json::to_string(&body).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let (status, text) = read_body(response).await?;
        interpret_response(status, &text)
    }
}

impl Renderer for HttpRenderer {
    async fn render(&self, request: RenderRequest) -> Result<String, RendererError> {
        tracing::info!(
            "Rendering {} ({})",
            request.audio_path,
            request.parameters.summary()
        );
        let result = self.send(&request).await;
        match &result {
            Ok(path) => tracing::info!("Renderer produced {}", path),
            Err(e) => tracing::warn!("Render failed: {}", e),
        }
        result
    }
}

/// Builds the reqwest client shared by the renderer and speech clients.
pub(super) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, RendererError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| RendererError::Transport(format!("Failed to build HTTP client: {e}")))
}

/// Maps a failed request to a readable transport error.
pub(super) fn transport_error(e: reqwest::Error) -> RendererError {
    let error_msg = if e.is_connect() {
        "Failed to connect to the server. Check that it is running.".to_string()
    } else if e.is_timeout() {
        "Request to the server timed out.".to_string()
    } else {
        format!("Network error: {e}")
    };
    RendererError::Transport(error_msg)
}

pub(super) async fn read_body(response: reqwest::Response) -> Result<(u16, String), RendererError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| RendererError::Transport(format!("Failed to read server response: {e}")))?;
    Ok((status, text))
}

/// Maps a status code and body to an asset reference.
///
/// A JSON body with `success: false` wins over the status code so the
/// server's own message reaches the user.
pub(super) fn interpret_response(status: u16, body: &str) -> Result<String, RendererError> {
    match serde_json::from_str::<ManipulateResponse>(body) {
        Ok(parsed) if parsed.success => match parsed.path {
            Some(path) if !path.trim().is_empty() => Ok(path),
            _ => Err(RendererError::InvalidResponse(
                "success response without an asset path".to_string(),
            )),
        },
        Ok(parsed) => Err(RendererError::RequestFailed(
            parsed
                .error
                .unwrap_or_else(|| "Server reported an unknown error".to_string()),
        )),
        Err(e) => {
            if (200..300).contains(&status) {
                return Err(RendererError::InvalidResponse(e.to_string()));
            }
            let human_readable = match status {
                404 => "Endpoint not found. Check the [renderer] URLs in the config.".to_string(),
                500 | 502 | 503 | 504 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("Server error (status {status}): {body}"),
            };
            Err(RendererError::RequestFailed(human_readable))
        }
    }
}
