//! Page components for the Dioxus-based web UI.
//!
//! Each page is a Dioxus component that renders a full page using the Layout component.

pub mod board;
pub mod settings;

pub use board::BoardPage;
pub use settings::SettingsPage;
