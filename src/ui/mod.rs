//! Terminal screens.

pub mod editor;
pub mod error;

pub use editor::EditorUi;
pub use error::ErrorScreen;
