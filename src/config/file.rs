//! Configuration file management for wavesculpt.
//!
//! Configuration lives in `~/.config/wavesculpt/wavesculpt.toml`. Every field
//! has a default, so a partial file is fine and a missing file is written out
//! with defaults on first run.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::params::EmotionPreset;
use crate::renderer::{RenderPolicy, SpeechFormat, DEFAULT_ENDPOINT};
use crate::session::SessionSettings;
use crate::wave::{Emotion, WaveGeometry};

/// Wave geometry and generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Number of control points (at least 2)
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Logical surface width
    #[serde(default = "default_width")]
    pub width: f64,
    /// Logical surface height
    #[serde(default = "default_height")]
    pub height: f64,
    /// Vertical margin kept free at the top and bottom
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Fixed random seed for reproducible waves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_sample_count() -> usize {
    40
}

fn default_width() -> f64 {
    1000.0
}

fn default_height() -> f64 {
    200.0
}

fn default_margin() -> f64 {
    10.0
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            width: default_width(),
            height: default_height(),
            margin: default_margin(),
            seed: None,
        }
    }
}

/// Bar visualizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfig {
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,
    /// Milliseconds between refreshes while playing
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_bar_count() -> usize {
    crate::visualizer::DEFAULT_BAR_COUNT
}

fn default_tick_ms() -> u64 {
    50
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            bar_count: default_bar_count(),
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    crate::history::DEFAULT_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// External renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Prefix for server-relative asset references returned by the renderer
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,
    /// "reject" or "concurrent"
    #[serde(default)]
    pub policy: RenderPolicy,
    /// Request timeout; no timeout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_asset_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            asset_base_url: default_asset_base_url(),
            policy: RenderPolicy::default(),
            timeout_secs: None,
        }
    }
}

impl RendererConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults for `wavesculpt speak`. The server is `renderer.asset_base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Unknown names fall back to neutral
    #[serde(default = "default_speech_emotion")]
    pub emotion: String,
    #[serde(default)]
    pub format: SpeechFormat,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_speech_emotion() -> String {
    Emotion::Neutral.id().to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            emotion: default_speech_emotion(),
            format: SpeechFormat::default(),
        }
    }
}

impl SpeechConfig {
    pub fn emotion(&self) -> Emotion {
        Emotion::parse_or_neutral(&self.emotion)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Player command line, e.g. "mpv --no-video". Falls back to common players.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WavesculptConfig {
    #[serde(default)]
    pub wave: WaveConfig,
    #[serde(default)]
    pub visualizer: VisualizerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Overrides of the built-in emotion presets, keyed by emotion name
    #[serde(default)]
    pub emotions: BTreeMap<String, EmotionPreset>,
}

impl WavesculptConfig {
    /// Loads the configuration, writing a default file first if none exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        Self::load_or_create(&config_path)
    }

    /// Loads `path`, creating it with defaults when missing.
    ///
    /// # Errors
    /// - If the file cannot be read or written
    /// - If the TOML is malformed
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let config_content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {e}", path.display()))?;
        let config: WavesculptConfig = toml::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config {}: {e}", path.display()))?;
        tracing::debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Validated wave geometry.
    ///
    /// # Errors
    /// - If the `[wave]` section describes an unusable surface
    pub fn geometry(&self) -> anyhow::Result<WaveGeometry> {
        let wave = &self.wave;
        WaveGeometry::new(wave.sample_count, wave.width, wave.height, wave.margin)
            .map_err(|e| anyhow!("Invalid [wave] config: {e}"))
    }

    /// Emotion overrides with unknown names dropped.
    pub fn emotion_overrides(&self) -> HashMap<Emotion, EmotionPreset> {
        self.emotions
            .iter()
            .filter_map(|(name, preset)| match name.parse::<Emotion>() {
                Ok(emotion) => Some((emotion, preset.clone())),
                Err(e) => {
                    tracing::warn!("Ignoring [emotions.{}]: {}", name, e);
                    None
                }
            })
            .collect()
    }

    /// Builds session settings; `seed` overrides the configured one.
    ///
    /// # Errors
    /// - If the geometry is invalid
    pub fn session_settings(&self, seed: Option<u64>) -> anyhow::Result<SessionSettings> {
        Ok(SessionSettings {
            geometry: self.geometry()?,
            bar_count: self.visualizer.bar_count,
            history_capacity: self.history.capacity,
            policy: self.renderer.policy,
            seed: seed.or(self.wave.seed),
            emotions: self.emotion_overrides(),
        })
    }
}

/// Retrieves the path to the config file, creating its directory.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("wavesculpt");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("wavesculpt.toml"))
}
