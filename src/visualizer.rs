//! Playback-synchronized bar visualizer.
//!
//! While playback runs, every tick resamples the envelope into a fixed number of
//! bars. This is a preview of the editable envelope, not an audio spectrum.

use crate::wave::Wave;

/// Default number of bars.
pub const DEFAULT_BAR_COUNT: usize = 32;

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Bars were refreshed; schedule the next tick
    Reschedule,
    /// Playback is not running; nothing was touched
    Stopped,
}

/// Bar display driven by the playing flag.
#[derive(Debug, Clone)]
pub struct Visualizer {
    playing: bool,
    bars: Vec<f64>,
}

impl Visualizer {
    /// Creates a stopped visualizer with `bar_count` empty bars.
    pub fn new(bar_count: usize) -> Self {
        Self {
            playing: false,
            bars: vec![0.0; bar_count.max(1)],
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// Current heights in percent, one per bar slot.
    pub fn bars(&self) -> &[f64] {
        &self.bars
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Host setter called on playback start, pause and end.
    ///
    /// Starting refreshes the bars immediately.
    pub fn set_playing(&mut self, playing: bool, wave: &Wave) {
        if self.playing == playing {
            return;
        }
        self.playing = playing;
        tracing::debug!("Visualizer {}", if playing { "started" } else { "stopped" });
        if playing {
            self.resample(wave);
        }
    }

    /// Stops the visualizer. Calling it while stopped does nothing.
    pub fn stop(&mut self) {
        if self.playing {
            self.playing = false;
            tracing::debug!("Visualizer stopped");
        }
    }

    /// One animation tick. The playing flag is checked before any bar is written.
    pub fn tick(&mut self, wave: &Wave) -> TickOutcome {
        if !self.playing {
            return TickOutcome::Stopped;
        }
        self.resample(wave);
        TickOutcome::Reschedule
    }

    /// Refreshes the bars from the wave if playing; used after drag moves.
    pub fn resample(&mut self, wave: &Wave) {
        if !self.playing {
            return;
        }

        let bar_count = self.bars.len();
        let points = wave.points();
        let height = wave.geometry().height();

        for (bar_index, bar) in self.bars.iter_mut().enumerate() {
            let index = source_index(bar_index, bar_count, points.len());
            *bar = bar_height(points[index].y(), height);
        }
    }
}

/// Control point sampled by bar `bar_index`: `floor(bar_index / bar_count * point_count)`.
pub fn source_index(bar_index: usize, bar_count: usize, point_count: usize) -> usize {
    (bar_index * point_count / bar_count).min(point_count.saturating_sub(1))
}

/// Bar height in percent for a logical `y`. The vertical axis grows downward,
/// bars grow upward.
pub fn bar_height(y: f64, height: f64) -> f64 {
    ((height - y) * 100.0 / height).clamp(0.0, 100.0)
}
