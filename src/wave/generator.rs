//! Procedural wave shapes for random and emotion presets.
//!
//! Every emotion maps to a fixed waveform family evaluated at each interior
//! index. The families are deterministic except for the jittered ones (angry,
//! shouting, neutral), which draw from the injected random source. Endpoints are
//! always pinned to the vertical center.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::model::{Wave, WaveError, WaveGeometry};

/// Half-width of the uniform offset applied by random mode.
const RANDOM_SPREAD: f64 = 30.0;

/// Emotion tags understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Excited,
    Calm,
    Fearful,
    Whisper,
    Shouting,
}

impl Emotion {
    pub fn id(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Excited => "excited",
            Emotion::Calm => "calm",
            Emotion::Fearful => "fearful",
            Emotion::Whisper => "whisper",
            Emotion::Shouting => "shouting",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Emotion::Neutral,
            Emotion::Happy,
            Emotion::Sad,
            Emotion::Angry,
            Emotion::Excited,
            Emotion::Calm,
            Emotion::Fearful,
            Emotion::Whisper,
            Emotion::Shouting,
        ]
    }

    /// Parses an emotion name, falling back to neutral for unknown tags.
    pub fn parse_or_neutral(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("Unsupported emotion: {name}. Falling back to neutral.");
            Emotion::Neutral
        })
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Returned when an emotion name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown emotion '{0}'")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Emotion::all()
            .iter()
            .find(|e| e.id() == needle)
            .copied()
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// What the generator should produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveShape {
    /// Uniform offsets around the center
    Random,
    /// The fixed waveform family of an emotion
    Emotion {
        emotion: Emotion,
        variability: f64,
        emphasis: f64,
    },
}

impl WaveShape {
    /// Emotion shape with modifiers; negative or NaN modifiers count as zero.
    pub fn emotion(emotion: Emotion, variability: f64, emphasis: f64) -> Self {
        WaveShape::Emotion {
            emotion,
            variability: non_negative(variability),
            emphasis: non_negative(emphasis),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Computes the vertical values for a shape without touching any wave.
pub fn shape_values<R: Rng + ?Sized>(
    shape: &WaveShape,
    geometry: &WaveGeometry,
    rng: &mut R,
) -> Vec<f64> {
    let count = geometry.sample_count();
    let center = geometry.center_y();

    (0..count)
        .map(|i| {
            if i == 0 || i == count - 1 {
                return center;
            }
            center + offset_at(shape, i as f64, rng)
        })
        .collect()
}

/// Offset from the center for interior index `i`.
fn offset_at<R: Rng + ?Sized>(shape: &WaveShape, i: f64, rng: &mut R) -> f64 {
    match *shape {
        WaveShape::Random => rng.gen_range(-RANDOM_SPREAD..RANDOM_SPREAD),
        WaveShape::Emotion {
            emotion,
            variability: v,
            emphasis: e,
        } => match emotion {
            Emotion::Happy | Emotion::Excited => (i * 0.5).sin() * 30.0 * (1.0 + v / 2.0),
            Emotion::Sad | Emotion::Calm => (i * 0.2).sin() * 20.0 * (1.0 - v / 2.0),
            Emotion::Angry | Emotion::Shouting => {
                let jitter: f64 = rng.gen::<f64>() * 10.0;
                ((i * 0.4).sin() * 25.0 + jitter) * (1.0 + e / 2.0)
            }
            Emotion::Fearful => (i * 0.3).sin() * 15.0 + (i * 2.0).sin() * 10.0 * v,
            Emotion::Whisper => (i * 0.3).sin() * 10.0 * (1.0 - e / 2.0),
            Emotion::Neutral => rng.gen::<f64>() * 30.0 - 15.0,
        },
    }
}

/// Replaces the whole wave with a generated shape.
///
/// # Errors
/// - If the wave's point count disagrees with its own geometry (never for
///   waves built through [`Wave::new`])
pub fn generate<R: Rng + ?Sized>(
    shape: &WaveShape,
    wave: &mut Wave,
    rng: &mut R,
) -> Result<(), WaveError> {
    let ys = shape_values(shape, wave.geometry(), rng);
    wave.replace(&ys)?;
    tracing::debug!("Generated {:?} wave (version {})", shape, wave.version());
    Ok(())
}
