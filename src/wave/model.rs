//! Control-point envelope model.
//!
//! A wave is a fixed-length, index-ordered sequence of control points. The
//! horizontal position of every point is derived from its index once and never
//! changes; only the vertical value is editable, and every write goes through
//! the same clamp so the envelope always stays inside the drawable band.

use serde::Serialize;

/// Errors raised by wave mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaveError {
    #[error("Invalid wave shape: expected {expected} values, got {actual}")]
    InvalidShape { expected: usize, actual: usize },

    #[error("Control point index {index} out of range (wave has {len} points)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid wave geometry: {0}")]
    InvalidGeometry(String),
}

/// Fixed logical dimensions of the editing surface.
///
/// Only [`WaveGeometry::new`] and `Default` build one, so every geometry holds
/// at least two points and a non-empty vertical band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveGeometry {
    sample_count: usize,
    width: f64,
    height: f64,
    margin: f64,
}

impl Default for WaveGeometry {
    fn default() -> Self {
        Self {
            sample_count: 40,
            width: 1000.0,
            height: 200.0,
            margin: 10.0,
        }
    }
}

impl WaveGeometry {
    /// Builds a geometry, rejecting shapes that cannot hold a drawable band.
    ///
    /// # Errors
    /// - If fewer than two control points are requested
    /// - If the width is not positive
    /// - If the margins leave no vertical room
    pub fn new(sample_count: usize, width: f64, height: f64, margin: f64) -> Result<Self, WaveError> {
        if sample_count < 2 {
            return Err(WaveError::InvalidGeometry(format!(
                "sample count must be at least 2 (got {sample_count})"
            )));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(WaveError::InvalidGeometry(format!(
                "width must be positive (got {width})"
            )));
        }
        if !margin.is_finite() || margin < 0.0 || !height.is_finite() || height <= 2.0 * margin {
            return Err(WaveError::InvalidGeometry(format!(
                "height {height} leaves no room inside a margin of {margin}"
            )));
        }

        Ok(Self {
            sample_count,
            width,
            height,
            margin,
        })
    }

    /// Number of control points (N)
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Logical surface width (W)
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Logical surface height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Vertical margin kept free at the top and bottom
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn min_y(&self) -> f64 {
        self.margin
    }

    pub fn max_y(&self) -> f64 {
        self.height - self.margin
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Horizontal position of the control point at `index`.
    pub fn x_for(&self, index: usize) -> f64 {
        let segment_width = self.width / (self.sample_count - 1) as f64;
        index as f64 * segment_width
    }

    /// Clamps a vertical value into the drawable band. NaN maps to the center.
    pub fn clamp_y(&self, y: f64) -> f64 {
        if y.is_nan() {
            return self.center_y();
        }
        y.clamp(self.min_y(), self.max_y())
    }
}

/// One sample of the editable envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPoint {
    index: usize,
    x: f64,
    y: f64,
}

impl ControlPoint {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// The ordered sequence of exactly `N` control points.
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    geometry: WaveGeometry,
    points: Vec<ControlPoint>,
    version: u64,
}

impl Wave {
    /// Creates a flat wave with every point at the vertical center.
    pub fn new(geometry: WaveGeometry) -> Self {
        let center = geometry.center_y();
        let points = (0..geometry.sample_count)
            .map(|index| ControlPoint {
                index,
                x: geometry.x_for(index),
                y: center,
            })
            .collect();

        Self {
            geometry,
            points,
            version: 0,
        }
    }

    pub fn geometry(&self) -> &WaveGeometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Read-only snapshot of the control points in index order.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    /// Vertical values in index order.
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Mutation counter, bumped by every successful write.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Atomically replaces every vertical value.
    ///
    /// Values are clamped into the drawable band. Horizontal positions and the
    /// point count never change.
    ///
    /// # Errors
    /// - If `ys` does not hold exactly one value per control point; the wave
    ///   is left untouched
    pub fn replace(&mut self, ys: &[f64]) -> Result<(), WaveError> {
        if ys.len() != self.points.len() {
            return Err(WaveError::InvalidShape {
                expected: self.points.len(),
                actual: ys.len(),
            });
        }

        for (point, &y) in self.points.iter_mut().zip(ys) {
            point.y = self.geometry.clamp_y(y);
        }
        self.version += 1;

        Ok(())
    }

    /// Sets the vertical value of one point, clamping silently.
    ///
    /// Returns the value actually stored.
    ///
    /// # Errors
    /// - If `index` is not a valid control point index
    pub fn set_y(&mut self, index: usize, y: f64) -> Result<f64, WaveError> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(WaveError::IndexOutOfRange { index, len })?;

        point.y = self.geometry.clamp_y(y);
        self.version += 1;

        Ok(point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_new_wave_is_flat_and_evenly_spaced() {
        let wave = Wave::new(WaveGeometry::default());

        assert_eq!(wave.len(), 40);
        assert!(wave.points().iter().all(|p| p.y() == 100.0));
        assert_eq!(wave.points()[0].x(), 0.0);
        assert_approx_eq!(wave.points()[39].x(), 1000.0);
        assert_approx_eq!(wave.points()[1].x(), 1000.0 / 39.0);
        for (i, point) in wave.points().iter().enumerate() {
            assert_eq!(point.index(), i);
        }
    }

    #[test]
    fn test_set_y_clamps_any_value() {
        let mut wave = Wave::new(WaveGeometry::default());
        let cases = [
            (-1e9, 10.0),
            (-5.0, 10.0),
            (5.0, 10.0),
            (10.0, 10.0),
            (55.5, 55.5),
            (190.0, 190.0),
            (190.0001, 190.0),
            (1e12, 190.0),
            (f64::INFINITY, 190.0),
            (f64::NEG_INFINITY, 10.0),
        ];

        for (input, expected) in cases {
            let stored = wave.set_y(7, input).unwrap();
            assert_eq!(stored, expected, "input {input}");
            assert_eq!(wave.points()[7].y(), expected);
        }
    }

    #[test]
    fn test_set_y_nan_lands_on_center() {
        let mut wave = Wave::new(WaveGeometry::default());
        wave.set_y(3, 42.0).unwrap();
        assert_eq!(wave.set_y(3, f64::NAN).unwrap(), 100.0);
    }

    #[test]
    fn test_set_y_rejects_bad_index() {
        let mut wave = Wave::new(WaveGeometry::default());
        let before = wave.clone();

        let err = wave.set_y(40, 50.0).unwrap_err();
        assert_eq!(err, WaveError::IndexOutOfRange { index: 40, len: 40 });
        assert_eq!(wave, before);
    }

    #[test]
    fn test_set_y_never_moves_x() {
        let mut wave = Wave::new(WaveGeometry::default());
        let xs: Vec<f64> = wave.points().iter().map(|p| p.x()).collect();

        wave.set_y(0, 12.0).unwrap();
        wave.set_y(39, 180.0).unwrap();

        let after: Vec<f64> = wave.points().iter().map(|p| p.x()).collect();
        assert_eq!(xs, after);
    }

    #[test]
    fn test_replace_wrong_length_leaves_wave_unchanged() {
        let mut wave = Wave::new(WaveGeometry::default());
        wave.set_y(5, 60.0).unwrap();
        let before = wave.clone();

        for len in [0, 1, 39, 41, 80] {
            let err = wave.replace(&vec![120.0; len]).unwrap_err();
            assert_eq!(
                err,
                WaveError::InvalidShape {
                    expected: 40,
                    actual: len
                }
            );
            assert_eq!(wave, before);
        }
    }

    #[test]
    fn test_replace_clamps_and_bumps_version() {
        let mut wave = Wave::new(WaveGeometry::default());
        let mut ys = vec![100.0; 40];
        ys[1] = 0.0;
        ys[2] = 500.0;

        wave.replace(&ys).unwrap();

        assert_eq!(wave.version(), 1);
        assert_eq!(wave.points()[1].y(), 10.0);
        assert_eq!(wave.points()[2].y(), 190.0);
        assert_eq!(wave.len(), 40);
    }

    #[test]
    fn test_geometry_validation() {
        assert!(WaveGeometry::new(1, 1000.0, 200.0, 10.0).is_err());
        assert!(WaveGeometry::new(40, 0.0, 200.0, 10.0).is_err());
        assert!(WaveGeometry::new(40, 1000.0, 20.0, 10.0).is_err());
        assert!(WaveGeometry::new(40, f64::NAN, 200.0, 10.0).is_err());

        assert!(WaveGeometry::new(0, 1000.0, 200.0, 10.0).is_err());
        assert!(WaveGeometry::new(40, f64::INFINITY, 200.0, 10.0).is_err());

        let geometry = WaveGeometry::new(16, 500.0, 100.0, 5.0).unwrap();
        assert_eq!(geometry.sample_count(), 16);
        assert_eq!(geometry.width(), 500.0);
        assert_eq!(geometry.min_y(), 5.0);
        assert_eq!(geometry.max_y(), 95.0);
        assert_eq!(geometry.center_y(), 50.0);
    }
}
