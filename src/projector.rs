//! Transient placeholder projection for group-member drags.
//!
//! While a member is dragged out of its group, the board offers two named
//! insertion slots around the origin group. Projection materializes a
//! render-only placeholder at the matching top-level index so the grid can
//! preview the landing spot. The placeholder never enters the persisted
//! board; it exists only in the projected sequence handed to the renderer.

use serde::{Deserialize, Serialize};

use crate::layout::{find_index, DashboardItem, ShortcutConfig, WidgetConfig};

/// Id carried by the render-only placeholder entity. Generated ids are
/// plain alphanumerics, so this can never collide with a persisted item.
pub const PLACEHOLDER_ID: &str = "__placeholder__";

/// Insertion slot relative to the origin group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderSlot {
    /// Directly before the group's cell.
    Before,
    /// Directly after the group's cell.
    Next,
}

pub fn is_placeholder(item: &DashboardItem) -> bool {
    item.id == PLACEHOLDER_ID
}

/// The entity stood up at the projected index.
pub fn placeholder_item() -> DashboardItem {
    DashboardItem {
        id: PLACEHOLDER_ID.to_string(),
        label: String::new(),
        url: None,
        icon: None,
        show_label: false,
        admin_only: false,
        config: WidgetConfig::Shortcut(ShortcutConfig::default()),
    }
}

/// Top-level index the slot maps to, or `None` when the origin group has
/// gone missing (e.g. deleted mid-drag). Missing origin suppresses the
/// placeholder rather than erroring.
pub fn placeholder_index(
    layout: &[DashboardItem],
    origin_group: &str,
    slot: PlaceholderSlot,
) -> Option<usize> {
    let group_index = find_index(layout, origin_group)?;
    Some(match slot {
        PlaceholderSlot::Before => group_index,
        PlaceholderSlot::Next => group_index + 1,
    })
}

/// Projected render sequence: the layout with a placeholder inserted at the
/// slot's index, or `None` when projection is suppressed.
pub fn project(
    layout: &[DashboardItem],
    origin_group: &str,
    slot: PlaceholderSlot,
) -> Option<Vec<DashboardItem>> {
    let index = placeholder_index(layout, origin_group, slot)?;
    let mut projected = layout.to_vec();
    projected.insert(index, placeholder_item());
    Some(projected)
}
