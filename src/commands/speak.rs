//! Speech generation.
//!
//! Sends text to the audio server's speech endpoint and opens the editor on the
//! spoken result, or prints its path.

use std::io::{self, Write};

use crate::commands::handle_edit;
use crate::config::{SpeechConfig, WavesculptConfig};
use crate::renderer::{SpeechClient, SpeechFormat, SpeechRequest};
use crate::wave::Emotion;

/// Options for `wavesculpt speak`. Unset fields come from `[speech]`.
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    pub text: Option<String>,
    pub language: Option<String>,
    pub emotion: Option<Emotion>,
    pub format: Option<SpeechFormat>,
    /// List the server's languages and emotions instead of speaking
    pub list: bool,
    /// Print the asset path instead of opening the editor
    pub print: bool,
    pub seed: Option<u64>,
}

impl SpeakOptions {
    /// Builds the request, filling gaps from `defaults`.
    ///
    /// # Errors
    /// - If no text was given
    pub fn request(&self, defaults: &SpeechConfig) -> anyhow::Result<SpeechRequest> {
        let text = self
            .text
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Please enter some text to convert to speech."))?;
        Ok(SpeechRequest {
            text,
            language: self
                .language
                .clone()
                .unwrap_or_else(|| defaults.language.clone()),
            emotion: self.emotion.unwrap_or_else(|| defaults.emotion()),
            format: self.format.unwrap_or(defaults.format),
        })
    }
}

/// Generates speech and opens it in the editor.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the server refuses the text or cannot be reached
/// - If the editor fails
pub async fn handle_speak(options: SpeakOptions) -> Result<(), anyhow::Error> {
    let config = WavesculptConfig::load()?;
    let client = SpeechClient::new(&config.renderer.asset_base_url, config.renderer.timeout())?;

    if options.list {
        return print_capabilities(&client).await;
    }

    let request = options.request(&config.speech)?;
    tracing::info!(
        "Generating speech: language={}, emotion={}, format={}",
        request.language,
        request.emotion,
        request.format
    );

    let path = client
        .synthesize(&request)
        .await
        .map_err(|e| anyhow::anyhow!("Error: {e}"))?;

    if options.print {
        println!("{path}");
        return Ok(());
    }

    handle_edit(Some(path), options.seed).await
}

async fn print_capabilities(client: &SpeechClient) -> Result<(), anyhow::Error> {
    let languages = client.languages().await?;
    let emotions = client.emotions().await?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Languages:")?;
    for (code, name) in &languages {
        writeln!(stdout, "  {code:<4} {name}")?;
    }
    writeln!(stdout, "Emotions:")?;
    for emotion in &emotions {
        writeln!(stdout, "  {emotion}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_uses_config_defaults() {
        let defaults = SpeechConfig {
            language: "bn".to_string(),
            emotion: "happy".to_string(),
            format: SpeechFormat::Wav,
        };
        let options = SpeakOptions {
            text: Some("Hello".to_string()),
            ..SpeakOptions::default()
        };

        let request = options.request(&defaults).unwrap();
        assert_eq!(request.language, "bn");
        assert_eq!(request.emotion, Emotion::Happy);
        assert_eq!(request.format, SpeechFormat::Wav);
    }

    #[test]
    fn test_options_override_config() {
        let options = SpeakOptions {
            text: Some("Hello".to_string()),
            language: Some("ml".to_string()),
            emotion: Some(Emotion::Angry),
            format: Some(SpeechFormat::Mp3),
            ..SpeakOptions::default()
        };
        let defaults = SpeechConfig {
            emotion: "unknown".to_string(),
            ..SpeechConfig::default()
        };

        let request = options.request(&defaults).unwrap();
        assert_eq!(request.language, "ml");
        assert_eq!(request.emotion, Emotion::Angry);
        assert_eq!(request.format, SpeechFormat::Mp3);
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let err = SpeakOptions::default()
            .request(&SpeechConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("enter some text"));
    }
}
