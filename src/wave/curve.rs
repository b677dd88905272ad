//! Smooth drawable path through the control points.
//!
//! Each pair of neighbouring points is joined by one cubic Bézier segment whose
//! handles sit a quarter of the way in from either end, at the height of the
//! endpoint they are nearer to. The curve passes through every point with flat
//! tangents and is rebuilt from scratch in O(N) on every change.

use serde::Serialize;
use std::fmt::Write as _;

use super::model::Wave;

/// Radius of the interactive handle drawn over each control point, in logical units.
pub const HANDLE_RADIUS: f64 = 4.0;

/// A point in the logical coordinate space of the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

impl PathPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One cubic segment ending at a control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicSegment {
    pub from: PathPoint,
    pub control1: PathPoint,
    pub control2: PathPoint,
    pub to: PathPoint,
}

impl CubicSegment {
    /// Evaluates the segment at `t ∈ [0, 1]`.
    pub fn point_at(&self, t: f64) -> PathPoint {
        let t = t.clamp(0.0, 1.0);
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        PathPoint {
            x: a * self.from.x + b * self.control1.x + c * self.control2.x + d * self.to.x,
            y: a * self.from.y + b * self.control1.y + c * self.control2.y + d * self.to.y,
        }
    }
}

/// How a path is presented. Both styles share identical geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// The visible stroke
    Foreground,
    /// Lower-opacity duplicate drawn underneath
    Background,
}

impl PathStyle {
    /// Stroke opacity applied to the wave colour.
    pub fn opacity(&self) -> f64 {
        match self {
            PathStyle::Foreground => 1.0,
            PathStyle::Background => 0.2,
        }
    }
}

/// The curve through every control point of a wave snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawablePath {
    pub start: PathPoint,
    pub segments: Vec<CubicSegment>,
}

impl DrawablePath {
    /// Interpolates the path for the given wave.
    pub fn from_wave(wave: &Wave) -> Self {
        let points = wave.points();
        let start = points
            .first()
            .map(|p| PathPoint::new(p.x(), p.y()))
            .unwrap_or(PathPoint::new(0.0, 0.0));

        let segments = points
            .windows(2)
            .map(|pair| {
                let (prev, point) = (&pair[0], &pair[1]);
                let quarter = (point.x() - prev.x()) / 4.0;
                CubicSegment {
                    from: PathPoint::new(prev.x(), prev.y()),
                    control1: PathPoint::new(prev.x() + quarter, prev.y()),
                    control2: PathPoint::new(point.x() - quarter, point.y()),
                    to: PathPoint::new(point.x(), point.y()),
                }
            })
            .collect();

        Self { start, segments }
    }

    /// SVG path data: `M x y C c1x c1y, c2x c2y, x y ...`.
    pub fn to_svg_path(&self) -> String {
        let mut data = format!("M {} {}", self.start.x, self.start.y);
        for segment in &self.segments {
            let _ = write!(
                data,
                " C {} {}, {} {}, {} {}",
                segment.control1.x,
                segment.control1.y,
                segment.control2.x,
                segment.control2.y,
                segment.to.x,
                segment.to.y
            );
        }
        data
    }

    /// Samples the whole curve as a polyline, `steps` points per segment.
    pub fn flatten(&self, steps: usize) -> Vec<PathPoint> {
        let steps = steps.max(1);
        let mut polyline = Vec::with_capacity(self.segments.len() * steps + 1);
        polyline.push(self.start);
        for segment in &self.segments {
            for step in 1..=steps {
                polyline.push(segment.point_at(step as f64 / steps as f64));
            }
        }
        polyline
    }
}

/// Position of the drag handle over each control point.
pub fn handle_positions(wave: &Wave) -> Vec<PathPoint> {
    wave.points()
        .iter()
        .map(|p| PathPoint::new(p.x(), p.y()))
        .collect()
}
