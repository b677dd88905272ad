//! Configuration management for wavesculpt.
//!
//! Loads the TOML configuration stored in the user's config directory, writing
//! defaults on first run, and turns it into session settings.

pub mod file;

pub use file::{
    get_config_path, HistoryConfig, PlaybackConfig, RendererConfig, SpeechConfig, VisualizerConfig,
    WaveConfig, WavesculptConfig,
};
