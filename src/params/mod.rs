//! Audio-transform parameter sets exchanged with the renderer.
//!
//! A parameter set is the unit sent to the external renderer and the unit kept
//! in history. This module also defines the adjustable ranges the host exposes
//! and how each value is displayed.

pub mod presets;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use presets::{EmotionPreset, HexColor, VoicePreset};

/// Effect applied by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffectType {
    #[default]
    None,
    Reverb,
    Echo,
    Distortion,
    Chorus,
}

impl EffectType {
    pub fn id(&self) -> &'static str {
        match self {
            EffectType::None => "none",
            EffectType::Reverb => "reverb",
            EffectType::Echo => "echo",
            EffectType::Distortion => "distortion",
            EffectType::Chorus => "chorus",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            EffectType::None,
            EffectType::Reverb,
            EffectType::Echo,
            EffectType::Distortion,
            EffectType::Chorus,
        ]
    }

    /// The next effect in selection order, wrapping around.
    pub fn next(&self) -> Self {
        let all = Self::all();
        let position = all.iter().position(|e| e == self).unwrap_or(0);
        all[(position + 1) % all.len()]
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for EffectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        EffectType::all()
            .iter()
            .find(|e| e.id() == needle)
            .copied()
            .ok_or_else(|| format!("Unknown effect type '{s}'"))
    }
}

/// Settings forwarded to the renderer.
///
/// Pitch (semitones) and volume (dB) go over the wire as whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub speed: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub pitch: f64,
    #[serde(serialize_with = "serialize_whole")]
    pub volume: f64,
    pub eq_bass: f64,
    pub eq_mid: f64,
    pub eq_treble: f64,
    pub effect_type: EffectType,
    pub effect_intensity: f64,
}

fn serialize_whole<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.round() as i64)
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 0.0,
            volume: 0.0,
            eq_bass: 0.0,
            eq_mid: 0.0,
            eq_treble: 0.0,
            effect_type: EffectType::None,
            effect_intensity: 0.5,
        }
    }
}

impl ParameterSet {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Speed => self.speed,
            Parameter::Pitch => self.pitch,
            Parameter::Volume => self.volume,
            Parameter::EqBass => self.eq_bass,
            Parameter::EqMid => self.eq_mid,
            Parameter::EqTreble => self.eq_treble,
            Parameter::EffectIntensity => self.effect_intensity,
        }
    }

    /// Sets a value, clamped into the parameter's range.
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        let value = parameter.clamp(value);
        match parameter {
            Parameter::Speed => self.speed = value,
            Parameter::Pitch => self.pitch = value,
            Parameter::Volume => self.volume = value,
            Parameter::EqBass => self.eq_bass = value,
            Parameter::EqMid => self.eq_mid = value,
            Parameter::EqTreble => self.eq_treble = value,
            Parameter::EffectIntensity => self.effect_intensity = value,
        }
    }

    /// Moves a value by `steps` increments of its step size.
    pub fn nudge(&mut self, parameter: Parameter, steps: i32) {
        let raw = self.get(parameter) + parameter.step() * steps as f64;
        // Snap to the step grid so repeated nudges don't accumulate float error
        let snapped = (raw / parameter.step()).round() * parameter.step();
        self.set(parameter, snapped);
    }

    /// Short label used in history listings, e.g. `Speed: 1.5x, Pitch: 7`.
    pub fn summary(&self) -> String {
        format!(
            "Speed: {}x, Pitch: {}",
            trim_float(self.speed),
            trim_float(self.pitch)
        )
    }
}

/// An adjustable numeric field of a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Speed,
    Pitch,
    Volume,
    EqBass,
    EqMid,
    EqTreble,
    EffectIntensity,
}

impl Parameter {
    pub fn all() -> &'static [Self] {
        &[
            Parameter::Speed,
            Parameter::Pitch,
            Parameter::Volume,
            Parameter::EqBass,
            Parameter::EqMid,
            Parameter::EqTreble,
            Parameter::EffectIntensity,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Speed => "Speed",
            Parameter::Pitch => "Pitch",
            Parameter::Volume => "Volume",
            Parameter::EqBass => "Bass",
            Parameter::EqMid => "Mid",
            Parameter::EqTreble => "Treble",
            Parameter::EffectIntensity => "Intensity",
        }
    }

    /// Inclusive `(min, max)` range.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Parameter::Speed => (0.5, 2.0),
            Parameter::Pitch => (-12.0, 12.0),
            Parameter::Volume => (-10.0, 10.0),
            Parameter::EqBass | Parameter::EqMid | Parameter::EqTreble => (-10.0, 10.0),
            Parameter::EffectIntensity => (0.0, 1.0),
        }
    }

    pub fn step(&self) -> f64 {
        match self {
            Parameter::Speed | Parameter::EffectIntensity => 0.1,
            _ => 1.0,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let (min, max) = self.range();
        if value.is_nan() {
            return min;
        }
        value.clamp(min, max)
    }

    /// Formats a value the way the host displays it.
    pub fn format(&self, value: f64) -> String {
        match self {
            Parameter::Speed => format!("{}x", trim_float(value)),
            Parameter::Pitch => signed(value),
            Parameter::Volume | Parameter::EqBass | Parameter::EqMid | Parameter::EqTreble => {
                format!("{} dB", signed(value))
            }
            Parameter::EffectIntensity => format!("{}%", (value * 100.0).round() as i64),
        }
    }

    /// The next parameter in display order, wrapping around.
    pub fn next(&self) -> Self {
        let all = Self::all();
        let position = all.iter().position(|p| p == self).unwrap_or(0);
        all[(position + 1) % all.len()]
    }

    pub fn previous(&self) -> Self {
        let all = Self::all();
        let position = all.iter().position(|p| p == self).unwrap_or(0);
        all[(position + all.len() - 1) % all.len()]
    }
}

fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", trim_float(value))
    } else {
        trim_float(value)
    }
}

/// Prints at most two decimals without trailing zeros.
fn trim_float(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
