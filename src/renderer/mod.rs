//! Boundary with the external audio renderer.
//!
//! The renderer turns a parameter set plus the currently loaded asset into a new
//! asset. The reference it returns is opaque here: it is stored, forwarded to
//! playback and kept in history, never interpreted. The same server also
//! synthesizes speech, which produces the first asset of a session.

mod http;
mod speech;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

use crate::params::ParameterSet;

pub use http::HttpRenderer;
pub use speech::{SpeechClient, SpeechFormat, SpeechRequest};

/// Default renderer endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/manipulate-audio";

/// Errors reported by a render request. All are recoverable and surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RendererError {
    /// The renderer answered and reported a failure
    #[error("{0}")]
    RequestFailed(String),

    /// The request could not be completed
    #[error("{0}")]
    Transport(String),

    /// The renderer answered with something that is not a render result
    #[error("Invalid renderer response: {0}")]
    InvalidResponse(String),

    /// The request was refused before it was sent
    #[error("{0}")]
    InvalidInput(String),
}

/// One render request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Reference to the asset currently loaded
    pub audio_path: String,
    pub parameters: ParameterSet,
}

/// What to do with an apply while an earlier request is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    /// Refuse the new request and tell the user
    #[default]
    Reject,
    /// Send it anyway; completions are applied in arrival order
    Concurrent,
}

impl fmt::Display for RenderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderPolicy::Reject => write!(f, "reject"),
            RenderPolicy::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Identifies one submitted render request. Increases monotonically per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that can render a parameter set into a new asset.
pub trait Renderer: Send + Sync + 'static {
    /// Renders the request, resolving to the new asset reference.
    fn render(
        &self,
        request: RenderRequest,
    ) -> impl Future<Output = Result<String, RendererError>> + Send;
}
