//! Voice and emotion presets.
//!
//! Voice presets only touch the fields they name. Emotion presets rewrite the
//! tone settings, pick an effect, choose a stroke colour and select the waveform
//! family the generator should draw.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::{EffectType, ParameterSet};
use crate::wave::{Emotion, WaveShape};

/// Default stroke colour of the wave.
pub const DEFAULT_WAVE_COLOR: &str = "#0d6efd";

/// Named voice presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicePreset {
    Chipmunk,
    Giant,
    Robot,
    Cathedral,
    Telephone,
    Megaphone,
}

impl VoicePreset {
    pub fn id(&self) -> &'static str {
        match self {
            VoicePreset::Chipmunk => "chipmunk",
            VoicePreset::Giant => "giant",
            VoicePreset::Robot => "robot",
            VoicePreset::Cathedral => "cathedral",
            VoicePreset::Telephone => "telephone",
            VoicePreset::Megaphone => "megaphone",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            VoicePreset::Chipmunk,
            VoicePreset::Giant,
            VoicePreset::Robot,
            VoicePreset::Cathedral,
            VoicePreset::Telephone,
            VoicePreset::Megaphone,
        ]
    }

    /// Overwrites the fields this preset defines and leaves the rest alone.
    pub fn apply(&self, params: &mut ParameterSet) {
        match self {
            VoicePreset::Chipmunk => {
                params.speed = 1.5;
                params.pitch = 7.0;
                params.eq_treble = 3.0;
            }
            VoicePreset::Giant => {
                params.speed = 0.7;
                params.pitch = -6.0;
                params.eq_bass = 3.0;
            }
            VoicePreset::Robot => {
                params.speed = 1.1;
                params.pitch = 0.0;
                params.effect_type = EffectType::Distortion;
                params.effect_intensity = 0.8;
            }
            VoicePreset::Cathedral => {
                params.speed = 0.9;
                params.effect_type = EffectType::Reverb;
                params.effect_intensity = 0.7;
            }
            VoicePreset::Telephone => {
                params.eq_bass = -5.0;
                params.eq_treble = -3.0;
                params.eq_mid = 4.0;
            }
            VoicePreset::Megaphone => {
                params.eq_mid = 5.0;
                params.eq_bass = -4.0;
                params.eq_treble = -2.0;
                params.volume = 3.0;
            }
        }
    }
}

impl fmt::Display for VoicePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for VoicePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        VoicePreset::all()
            .iter()
            .find(|p| p.id() == needle)
            .copied()
            .ok_or_else(|| format!("Unknown voice preset '{s}'"))
    }
}

/// Base values attached to an emotion button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionPreset {
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub emphasis: f64,
    #[serde(default)]
    pub variability: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_speed() -> f64 {
    1.0
}

fn default_color() -> String {
    DEFAULT_WAVE_COLOR.to_string()
}

impl EmotionPreset {
    /// Built-in base values for an emotion.
    pub fn builtin(emotion: Emotion) -> Self {
        let (speed, pitch, volume, emphasis, variability, color) = match emotion {
            Emotion::Neutral => (1.0, 0.0, 0.0, 0.0, 0.0, DEFAULT_WAVE_COLOR),
            Emotion::Happy => (1.1, 2.0, 1.0, 0.0, 1.0, "#ffc107"),
            Emotion::Sad => (0.85, -2.0, -2.0, 0.0, 0.5, "#6c757d"),
            Emotion::Angry => (1.15, 1.0, 3.0, 2.0, 0.0, "#dc3545"),
            Emotion::Excited => (1.2, 3.0, 2.0, 0.0, 1.5, "#fd7e14"),
            Emotion::Calm => (0.9, -1.0, -1.0, 0.0, 0.3, "#20c997"),
            Emotion::Fearful => (1.05, 1.0, -1.0, 0.0, 1.0, "#6f42c1"),
            Emotion::Whisper => (0.9, -1.0, -4.0, 1.0, 0.0, "#adb5bd"),
            Emotion::Shouting => (1.1, 1.0, 5.0, 3.0, 0.0, "#d63384"),
        };

        Self {
            speed,
            pitch,
            volume,
            emphasis,
            variability,
            color: color.to_string(),
        }
    }

    /// Rewrites `params` for `emotion` and returns the wave shape to generate.
    pub fn apply(&self, emotion: Emotion, params: &mut ParameterSet) -> WaveShape {
        params.speed = self.speed;
        params.pitch = self.pitch;
        params.volume = self.volume;

        let (bass, mid, treble) = match emotion {
            Emotion::Happy => (1.0, 1.0, 3.0),
            Emotion::Sad => (2.0, -1.0, -2.0),
            Emotion::Angry => (-1.0, 2.0, 4.0),
            Emotion::Excited => (1.0, 2.0, 3.0),
            Emotion::Calm => (2.0, 0.0, -1.0),
            Emotion::Fearful => (-2.0, 0.0, 3.0),
            Emotion::Whisper => (-2.0, -1.0, 4.0),
            Emotion::Shouting => (2.0, 3.0, 3.0),
            Emotion::Neutral => (0.0, 0.0, 0.0),
        };
        params.eq_bass = bass;
        params.eq_mid = mid;
        params.eq_treble = treble;

        let (effect, intensity) = match emotion {
            Emotion::Calm | Emotion::Sad => (EffectType::Reverb, 0.3),
            Emotion::Angry | Emotion::Shouting => (EffectType::Distortion, 0.3),
            Emotion::Whisper => (EffectType::Reverb, 0.5),
            Emotion::Fearful => (EffectType::Chorus, 0.3),
            _ => (EffectType::None, 0.5),
        };
        params.effect_type = effect;
        params.effect_intensity = intensity;

        WaveShape::emotion(emotion, self.variability, self.emphasis)
    }

    /// Stroke colour, falling back to the default for malformed values.
    pub fn stroke_color(&self) -> HexColor {
        HexColor::parse(&self.color).unwrap_or_else(|| {
            tracing::warn!("Invalid wave colour '{}', using default", self.color);
            HexColor::default()
        })
    }
}

/// An `#rrggbb` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for HexColor {
    fn default() -> Self {
        // DEFAULT_WAVE_COLOR
        Self {
            r: 0x0d,
            g: 0x6e,
            b: 0xfd,
        }
    }
}

fn hex_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").ok())
        .as_ref()
}

impl HexColor {
    /// Parses `#rrggbb`; returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = hex_pattern()?.captures(text.trim())?;
        let channel = |i: usize| u8::from_str_radix(&caps[i], 16).ok();
        Some(Self {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
        })
    }

    /// CSS `rgba(...)` form with the given opacity.
    pub fn to_rgba(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_voice_preset_only_touches_named_fields() {
        let mut params = ParameterSet {
            volume: 4.0,
            eq_mid: -2.0,
            ..ParameterSet::default()
        };
        VoicePreset::Chipmunk.apply(&mut params);

        assert_eq!(params.speed, 1.5);
        assert_eq!(params.pitch, 7.0);
        assert_eq!(params.eq_treble, 3.0);
        assert_eq!(params.volume, 4.0);
        assert_eq!(params.eq_mid, -2.0);
    }

    #[test]
    fn test_robot_sets_effect() {
        let mut params = ParameterSet::default();
        VoicePreset::Robot.apply(&mut params);
        assert_eq!(params.effect_type, EffectType::Distortion);
        assert_eq!(params.effect_intensity, 0.8);
    }

    #[test]
    fn test_emotion_preset_rewrites_tone_and_effect() {
        let mut params = ParameterSet::default();
        let preset = EmotionPreset::builtin(Emotion::Angry);
        let shape = preset.apply(Emotion::Angry, &mut params);

        assert_eq!(params.speed, 1.15);
        assert_eq!((params.eq_bass, params.eq_mid, params.eq_treble), (-1.0, 2.0, 4.0));
        assert_eq!(params.effect_type, EffectType::Distortion);
        assert_eq!(params.effect_intensity, 0.3);
        assert_eq!(shape, WaveShape::emotion(Emotion::Angry, 0.0, 2.0));
    }

    #[test]
    fn test_neutral_emotion_clears_effect() {
        let mut params = ParameterSet {
            effect_type: EffectType::Echo,
            effect_intensity: 0.9,
            eq_bass: 5.0,
            ..ParameterSet::default()
        };
        EmotionPreset::builtin(Emotion::Neutral).apply(Emotion::Neutral, &mut params);

        assert_eq!(params.effect_type, EffectType::None);
        assert_eq!(params.effect_intensity, 0.5);
        assert_eq!(params.eq_bass, 0.0);
    }

    #[test]
    fn test_hex_color_parsing() {
        let color = HexColor::parse("#ff8000").unwrap();
        assert_eq!(color, HexColor { r: 255, g: 128, b: 0 });
        assert_eq!(color.to_rgba(0.2), "rgba(255, 128, 0, 0.2)");
        assert_eq!(color.to_string(), "#ff8000");
        assert_eq!(HexColor::parse(DEFAULT_WAVE_COLOR), Some(HexColor::default()));

        assert_eq!(HexColor::parse("ff8000"), None);
        assert_eq!(HexColor::parse("#ff80"), None);
        assert_eq!(HexColor::parse("#gg8000"), None);
    }

    #[test]
    fn test_hex_pattern_is_compiled_once() {
        let first = hex_pattern().unwrap();
        let second = hex_pattern().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(HexColor::parse("  #DC3545 "), Some(HexColor { r: 220, g: 53, b: 69 }));
    }

    #[test]
    fn test_invalid_preset_colour_falls_back() {
        let preset = EmotionPreset {
            color: "blue".to_string(),
            ..EmotionPreset::builtin(Emotion::Calm)
        };
        assert_eq!(preset.stroke_color(), HexColor::default());
    }

    #[test]
    fn test_every_builtin_colour_parses() {
        for emotion in Emotion::all() {
            assert!(HexColor::parse(&EmotionPreset::builtin(*emotion).color).is_some());
        }
    }
}
