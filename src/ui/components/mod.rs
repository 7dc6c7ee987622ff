//! Shared UI components for the Dioxus-based web UI.

pub mod layout;
pub mod nav;
pub mod theme;

pub use layout::Layout;
pub use nav::Nav;
pub use theme::ThemeSwitcher;
