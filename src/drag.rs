//! Pointer-driven dragging of control points.
//!
//! The controller is a two-state machine: idle, or dragging exactly one point.
//! A second press while a drag is active is ignored. Moves convert host screen
//! coordinates into the logical surface space and write only the vertical value
//! of the dragged point; the wave clamps it.

use crate::wave::{Wave, WaveError};

/// Errors raised when starting a drag.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DragError {
    #[error("Cannot drag control point {index}: wave has {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Pointer position in host screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The host's current bounding rectangle of the rendering surface, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Converts a screen position into the logical `logical_width × logical_height`
    /// space. Returns `None` for a degenerate surface.
    pub fn to_logical(
        &self,
        pointer: Pointer,
        logical_width: f64,
        logical_height: f64,
    ) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x = (pointer.x - self.left) / self.width * logical_width;
        let y = (pointer.y - self.top) / self.height * logical_height;
        Some((x, y))
    }
}

/// An active drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub point_index: usize,
    /// Wave version observed when the drag began
    pub origin_version: u64,
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Started,
    /// Another point is already being dragged
    Ignored,
}

/// Result of a move while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMove {
    pub point_index: usize,
    /// Value stored after clamping
    pub stored_y: f64,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Index of the point being dragged, if any.
    pub fn active_point(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging(session) => Some(session.point_index),
            DragState::Idle => None,
        }
    }

    /// Starts dragging point `index`.
    ///
    /// # Errors
    /// - If `index` is not a control point of `wave`
    pub fn begin(&mut self, index: usize, wave: &Wave) -> Result<DragOutcome, DragError> {
        if index >= wave.len() {
            return Err(DragError::IndexOutOfRange {
                index,
                len: wave.len(),
            });
        }

        if let DragState::Dragging(active) = self.state {
            tracing::debug!(
                "Ignoring drag start on point {} while point {} is active",
                index,
                active.point_index
            );
            return Ok(DragOutcome::Ignored);
        }

        self.state = DragState::Dragging(DragSession {
            point_index: index,
            origin_version: wave.version(),
        });
        tracing::trace!("Drag started on point {}", index);
        Ok(DragOutcome::Started)
    }

    /// Applies a pointer move to the dragged point.
    ///
    /// Returns `Ok(None)` when idle or when the surface is degenerate.
    ///
    /// # Errors
    /// - If the dragged index no longer exists in `wave`
    pub fn move_to(
        &mut self,
        pointer: Pointer,
        surface: &SurfaceRect,
        wave: &mut Wave,
    ) -> Result<Option<DragMove>, WaveError> {
        let DragState::Dragging(session) = self.state else {
            return Ok(None);
        };

        let geometry = *wave.geometry();
        let Some((_, y)) = surface.to_logical(pointer, geometry.width(), geometry.height()) else {
            return Ok(None);
        };

        let stored_y = wave.set_y(session.point_index, y)?;
        Ok(Some(DragMove {
            point_index: session.point_index,
            stored_y,
        }))
    }

    /// Ends the current drag. No-op when idle.
    pub fn end(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                tracing::trace!("Drag ended on point {}", session.point_index);
                Some(session)
            }
            DragState::Idle => None,
        }
    }
}

/// Finds the control point nearest to `pointer` within `radius` logical units.
///
/// Hosts that cannot attach a handle element to each point use this to turn a
/// raw press into a drag start.
pub fn hit_test(pointer: Pointer, surface: &SurfaceRect, wave: &Wave, radius: f64) -> Option<usize> {
    let geometry = wave.geometry();
    let (x, y) = surface.to_logical(pointer, geometry.width(), geometry.height())?;

    wave.points()
        .iter()
        .map(|p| (p.index(), (p.x() - x).hypot(p.y() - y)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::WaveGeometry;
    use assert_approx_eq::assert_approx_eq;

    /// A 500×100 px surface drawn at (20, 40).
    fn surface() -> SurfaceRect {
        SurfaceRect::new(20.0, 40.0, 500.0, 100.0)
    }

    #[test]
    fn test_begin_and_end() {
        let wave = Wave::new(WaveGeometry::default());
        let mut drag = DragController::new();

        assert_eq!(drag.begin(4, &wave).unwrap(), DragOutcome::Started);
        assert_eq!(drag.active_point(), Some(4));

        let session = drag.end().unwrap();
        assert_eq!(session.point_index, 4);
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.end(), None);
    }

    #[test]
    fn test_second_begin_is_ignored() {
        let wave = Wave::new(WaveGeometry::default());
        let mut drag = DragController::new();

        drag.begin(10, &wave).unwrap();
        let before = drag.state();
        assert_eq!(drag.begin(3, &wave).unwrap(), DragOutcome::Ignored);
        assert_eq!(drag.state(), before);
        assert_eq!(drag.active_point(), Some(10));
    }

    #[test]
    fn test_begin_out_of_range() {
        let wave = Wave::new(WaveGeometry::default());
        let mut drag = DragController::new();

        assert!(drag.begin(40, &wave).is_err());
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_move_converts_and_clamps() {
        let mut wave = Wave::new(WaveGeometry::default());
        let mut drag = DragController::new();
        drag.begin(12, &wave).unwrap();

        // 25 px below the top of a 100 px surface is a quarter of the height
        let moved = drag
            .move_to(Pointer::new(300.0, 65.0), &surface(), &mut wave)
            .unwrap()
            .unwrap();
        assert_eq!(moved.point_index, 12);
        assert_approx_eq!(moved.stored_y, 50.0);
        assert_approx_eq!(wave.points()[12].y(), 50.0);

        // Above the surface clamps to the top margin
        let moved = drag
            .move_to(Pointer::new(300.0, 0.0), &surface(), &mut wave)
            .unwrap()
            .unwrap();
        assert_eq!(moved.stored_y, 10.0);
    }

    #[test]
    fn test_move_only_changes_y_of_dragged_point() {
        let mut wave = Wave::new(WaveGeometry::default());
        let before = wave.points().to_vec();
        let mut drag = DragController::new();
        drag.begin(5, &wave).unwrap();

        drag.move_to(Pointer::new(519.0, 120.0), &surface(), &mut wave)
            .unwrap();

        for (old, new) in before.iter().zip(wave.points()) {
            assert_eq!(old.x(), new.x());
            if new.index() != 5 {
                assert_eq!(old.y(), new.y());
            }
        }
        assert_approx_eq!(wave.points()[5].y(), 160.0);
    }

    #[test]
    fn test_move_when_idle_is_noop() {
        let mut wave = Wave::new(WaveGeometry::default());
        let mut drag = DragController::new();

        let result = drag
            .move_to(Pointer::new(100.0, 100.0), &surface(), &mut wave)
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(wave.version(), 0);
    }

    #[test]
    fn test_degenerate_surface_ignores_move() {
        let mut wave = Wave::new(WaveGeometry::default());
        let mut drag = DragController::new();
        drag.begin(1, &wave).unwrap();

        let flat = SurfaceRect::new(0.0, 0.0, 500.0, 0.0);
        assert_eq!(
            drag.move_to(Pointer::new(1.0, 1.0), &flat, &mut wave).unwrap(),
            None
        );
    }

    #[test]
    fn test_hit_test_finds_nearest_point() {
        let wave = Wave::new(WaveGeometry::default());
        let surface = SurfaceRect::new(0.0, 0.0, 1000.0, 200.0);
        let x10 = wave.points()[10].x();

        assert_eq!(hit_test(Pointer::new(x10 + 2.0, 101.0), &surface, &wave, 4.0), Some(10));
        assert_eq!(hit_test(Pointer::new(x10 + 12.0, 100.0), &surface, &wave, 4.0), None);
        assert_eq!(hit_test(Pointer::new(x10, 150.0), &surface, &wave, 4.0), None);
    }
}
