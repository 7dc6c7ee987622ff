//! Board layout model and containment logic.
//!
//! This module owns:
//! - The persisted data model (items, groups, per-viewport layouts)
//! - Pure containment mutators (move/reorder/delete/duplicate)
//! - The reducer-style store that applies dispatched actions

pub mod item;
pub mod mutate;
pub mod store;

pub use item::{
    count_items, demo_board, find_group, find_index, find_item, generate_item_id, id_in_use,
    validate_board, Board, DashboardItem, GroupConfig, GroupMember, HealthCheck, LayoutError,
    ShortcutConfig, Viewport, WakeOnLan, WidgetConfig, WidgetSpec,
};
pub use store::{apply, LayoutAction, LayoutStore};
