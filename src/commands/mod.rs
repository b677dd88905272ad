//! Application command handlers for wavesculpt.
//!
//! # Commands
//! - `edit`: Interactive envelope editor (default)
//! - `generate`: Print a generated wave as SVG or JSON
//! - `speak`: Generate speech and open it in the editor
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod edit;
pub mod generate;
pub mod logs;
pub mod speak;

pub use config::handle_config;
pub use edit::handle_edit;
pub use generate::{handle_generate, GenerateOptions, OutputFormat};
pub use logs::handle_logs;
pub use speak::{handle_speak, SpeakOptions};
