//! Speech synthesis client.
//!
//! The audio server turns text into a spoken asset with `POST /api/tts` and
//! lists what it supports under `/api/languages` and `/api/emotions`. The
//! returned path becomes the asset the editor sculpts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::http::{build_client, interpret_response, read_body, transport_error};
use super::RendererError;
use crate::wave::Emotion;

/// Longest text accepted before sending, in characters.
pub const MAX_TEXT_CHARS: usize = 800;

/// Longest text the server accepts, in words.
pub const MAX_TEXT_WORDS: usize = 400;

/// Audio container requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechFormat {
    #[default]
    Mp3,
    Wav,
}

impl fmt::Display for SpeechFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechFormat::Mp3 => write!(f, "mp3"),
            SpeechFormat::Wav => write!(f, "wav"),
        }
    }
}

impl FromStr for SpeechFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(SpeechFormat::Mp3),
            "wav" => Ok(SpeechFormat::Wav),
            other => Err(format!("Unsupported audio format '{other}' (expected mp3 or wav)")),
        }
    }
}

/// Text to speak, with its language and delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    /// Language code such as `en` or `hi`; the server falls back to `en`
    pub language: String,
    /// Unknown emotions are spoken as neutral by the server
    pub emotion: Emotion,
    pub format: SpeechFormat,
}

impl SpeechRequest {
    /// English, neutral, mp3.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: "en".to_string(),
            emotion: Emotion::Neutral,
            format: SpeechFormat::Mp3,
        }
    }

    /// Checks the text limits before anything is sent.
    ///
    /// # Errors
    /// - If the text is blank
    /// - If it has more than 400 words or more than 800 characters
    pub fn validate(&self) -> Result<(), RendererError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(RendererError::InvalidInput(
                "Please enter some text to convert to speech.".to_string(),
            ));
        }
        let words = text.split_whitespace().count();
        if words > MAX_TEXT_WORDS {
            return Err(RendererError::InvalidInput(format!(
                "Text exceeds maximum length of {MAX_TEXT_WORDS} words (current: {words} words)"
            )));
        }
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(RendererError::InvalidInput(format!(
                "Text is too long. Please limit your text to {MAX_TEXT_CHARS} characters."
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LanguagesResponse {
    languages: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EmotionsResponse {
    emotions: Vec<String>,
}

/// Client for the server's speech endpoints.
pub struct SpeechClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpeechClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:5000`.
    ///
    /// # Errors
    /// - If the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RendererError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Synthesizes `request` and returns the path of the new asset.
    ///
    /// # Errors
    /// - If the text fails validation
    /// - If the server cannot be reached or reports a failure
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<String, RendererError> {
        request.validate()?;

        let url = self.url("/api/tts");
        tracing::debug!(
            "Speech API Call:\n  URL: {}\n  Method: POST\n  Language: {}\n  Emotion: {}\n  Format: {}\n  Characters: {}",
            url,
            request.language,
            request.emotion,
            request.format,
            request.text.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let (status, text) = read_body(response).await?;

        let result = interpret_response(status, &text);
        match &result {
            Ok(path) => tracing::info!("Speech generated at {}", path),
            Err(e) => tracing::warn!("Speech generation failed: {}", e),
        }
        result
    }

    /// Language codes and display names the server supports.
    ///
    /// # Errors
    /// - If the server cannot be reached or answers with something else
    pub async fn languages(&self) -> Result<BTreeMap<String, String>, RendererError> {
        let parsed: LanguagesResponse = self.get_json("/api/languages").await?;
        Ok(parsed.languages)
    }

    /// Emotion names the server supports.
    ///
    /// # Errors
    /// - If the server cannot be reached or answers with something else
    pub async fn emotions(&self) -> Result<Vec<String>, RendererError> {
        let parsed: EmotionsResponse = self.get_json("/api/emotions").await?;
        Ok(parsed.emotions)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, RendererError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        let (status, text) = read_body(response).await?;
        if !(200..300).contains(&status) {
            return Err(RendererError::RequestFailed(format!(
                "Server error (status {status}) for {path}"
            )));
        }
        serde_json::from_str(&text).map_err(|e| RendererError::InvalidResponse(e.to_string()))
    }
}
