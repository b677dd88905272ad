//! The editable sound envelope.
//!
//! Holds the control-point model, the curve interpolated through it, and the
//! procedural generators that reshape it.

pub mod curve;
pub mod generator;
pub mod model;

pub use curve::{handle_positions, CubicSegment, DrawablePath, PathPoint, PathStyle, HANDLE_RADIUS};
pub use generator::{generate, shape_values, Emotion, UnknownEmotion, WaveShape};
pub use model::{ControlPoint, Wave, WaveError, WaveGeometry};
