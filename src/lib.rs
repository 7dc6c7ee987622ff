//! Homegrid - Rust Implementation
//!
//! A self-hosted dashboard board with server-side drag and drop editing.
//!
//! This library provides:
//! - The persisted board model (shortcuts, capacity-bounded groups, widgets)
//! - A drag session engine with coverage-based drop classification
//! - Pure containment mutators applied through a reducer-style store
//! - Server-Sent Events for real-time updates
//! - Web UI for the board grid (Pico CSS)

pub mod api;
pub mod bus;
pub mod collision;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod persist;
pub mod projector;
pub mod session;
pub mod ui;
