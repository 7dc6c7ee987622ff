//! Web UI handlers - the board grid and its settings page
//!
//! Pages are Dioxus components rendered server-side; interactivity lives
//! in per-page scripts that talk to the REST API and the /events stream.
//! The drag engine itself runs in the server process, so the board page
//! only measures cell rects and reports pointer movement.
//!
//! Using Pico CSS (classless CSS framework) for clean, accessible,
//! mobile-friendly design without custom CSS maintenance burden.
//!
//! - components/ - Shared Dioxus components (nav, theme, layout)
//! - pages/ - Page components (board, settings)

pub mod components;
pub mod pages;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use dioxus::prelude::*;

use crate::api::AppState;
use pages::{BoardPage, SettingsPage};

/// GET / - Board grid with drag and drop editing
pub async fn board_page(State(_state): State<AppState>) -> impl IntoResponse {
    let html = dioxus::ssr::render_element(rsx! { BoardPage {} });
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"dark\">\n{}</html>",
        html
    ))
}

/// GET /settings - Status overview and raw board editor
pub async fn settings_page(State(_state): State<AppState>) -> impl IntoResponse {
    let html = dioxus::ssr::render_element(rsx! { SettingsPage {} });
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"dark\">\n{}</html>",
        html
    ))
}
