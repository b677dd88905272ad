//! wavesculpt: sculpt a sound envelope in the terminal.
//!
//! The core (wave model, curve, generators, drag, visualizer, parameters and
//! history) is synchronous and free of I/O. The session state machine drives
//! it from events, the scheduler feeds those events from a tokio runtime, and
//! the terminal UI, renderer client and player sit at the edges.

pub mod app;
pub mod commands;
pub mod config;
pub mod drag;
pub mod history;
pub mod logging;
pub mod params;
pub mod playback;
pub mod renderer;
pub mod session;
pub mod ui;
pub mod visualizer;
pub mod wave;
