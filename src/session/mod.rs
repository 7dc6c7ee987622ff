//! Drag session state machine.
//!
//! Owns the only live drag in the process: `Idle -> Active -> Idle`. Every
//! pointer move feeds collision resolution and origin-crossing tracking;
//! the drop classifies into exactly one layout action and hands the board
//! back through the reducer. Lifecycle signals go out on the shared bus so
//! group containers can follow along without holding references to the
//! grid.

use std::sync::Arc;

use crate::bus::{BoardEvent, SharedBus};
use crate::collision::{resolve_drop_target, DragKind, DropTarget, HitTuning, TargetKind};
use crate::geometry::Rect;
use crate::layout::{
    find_item, DashboardItem, GroupMember, LayoutAction, LayoutStore, Viewport, WidgetConfig,
};
use crate::projector::{self, placeholder_item, PlaceholderSlot, PLACEHOLDER_ID};

/// Scroll control for whatever hosts the board grid.
///
/// The engine needs two things from its host: a way to jump back to the
/// top when a member leaves its group (so the landing slots are on
/// screen), and a scroll lock while a drag is live. Everything else about
/// scrolling stays on the UI side.
pub trait ScrollViewport {
    fn scroll_to_top(&self);
    fn set_scroll_locked(&self, locked: bool);
}

/// Viewport that ignores every request. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopViewport;

impl ScrollViewport for NoopViewport {
    fn scroll_to_top(&self) {}
    fn set_scroll_locked(&self, _locked: bool) {}
}

pub type SharedViewport = Arc<dyn ScrollViewport + Send + Sync>;

/// Snapshot of the dragged thing, kept for overlay rendering after the
/// source cell stops existing visually.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSnapshot {
    Item(DashboardItem),
    Member(GroupMember),
}

/// The transient descriptor of the active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEntity {
    pub kind: DragKind,
    pub snapshot: DragSnapshot,
    /// Owning group id when a member is dragged out of its group.
    pub origin_group: Option<String>,
}

impl DragEntity {
    /// Entity for a top-level item; the drag kind follows the item's
    /// config variant.
    pub fn for_item(item: &DashboardItem) -> Self {
        let kind = match &item.config {
            WidgetConfig::Shortcut(_) => DragKind::AppShortcut,
            WidgetConfig::Group(_) => DragKind::GroupWidget,
            WidgetConfig::Widget(_) => DragKind::Other,
        };
        Self {
            kind,
            snapshot: DragSnapshot::Item(item.clone()),
            origin_group: None,
        }
    }

    /// Entity for a member dragged out of `group_id`'s open overlay.
    pub fn for_member(group_id: impl Into<String>, member: &GroupMember) -> Self {
        Self {
            kind: DragKind::GroupMember,
            snapshot: DragSnapshot::Member(member.clone()),
            origin_group: Some(group_id.into()),
        }
    }

    /// Entity for the render-only placeholder standing in for an ejected
    /// member.
    pub fn for_placeholder(origin_group: impl Into<String>) -> Self {
        Self {
            kind: DragKind::Placeholder,
            snapshot: DragSnapshot::Item(placeholder_item()),
            origin_group: Some(origin_group.into()),
        }
    }

    pub fn item_id(&self) -> &str {
        match &self.snapshot {
            DragSnapshot::Item(item) => &item.id,
            DragSnapshot::Member(member) => &member.id,
        }
    }

    pub fn label(&self) -> &str {
        match &self.snapshot {
            DragSnapshot::Item(item) => &item.label,
            DragSnapshot::Member(member) => &member.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HoverTarget {
    id: String,
    kind: TargetKind,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveDrag {
    entity: DragEntity,
    hover: Option<HoverTarget>,
    ejected_from_origin: bool,
    placeholder_slot: Option<PlaceholderSlot>,
}

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    Idle,
    Active(ActiveDrag),
}

/// What a finished session did to the board.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// The single action the drop classified into, `None` for no-change.
    pub applied: Option<LayoutAction>,
    /// Whether the dispatch actually altered the layout.
    pub changed: bool,
}

impl SessionOutcome {
    fn unchanged() -> Self {
        Self {
            applied: None,
            changed: false,
        }
    }
}

/// The one-at-a-time drag session controller.
pub struct DragSession {
    bus: SharedBus,
    scroll: SharedViewport,
    state: SessionState,
}

impl DragSession {
    pub fn new(bus: SharedBus, scroll: SharedViewport) -> Self {
        Self {
            bus,
            scroll,
            state: SessionState::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    pub fn entity(&self) -> Option<&DragEntity> {
        match &self.state {
            SessionState::Active(drag) => Some(&drag.entity),
            SessionState::Idle => None,
        }
    }

    pub fn hover_target(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active(drag) => drag.hover.as_ref().map(|h| h.id.as_str()),
            SessionState::Idle => None,
        }
    }

    pub fn ejected_from_origin(&self) -> bool {
        matches!(&self.state, SessionState::Active(drag) if drag.ejected_from_origin)
    }

    pub fn placeholder_slot(&self) -> Option<PlaceholderSlot> {
        match &self.state {
            SessionState::Active(drag) => drag.placeholder_slot,
            SessionState::Idle => None,
        }
    }

    /// Begin a session for `entity`. Any stale state left from a prior
    /// session is cleared first, so a missed drag-end can never wedge the
    /// controller.
    pub fn start(&mut self, entity: DragEntity) {
        if self.is_active() {
            tracing::warn!(
                "Drag start for {} while a session is active; discarding stale state",
                entity.item_id()
            );
        }
        self.reset_to_idle();
        self.scroll.set_scroll_locked(true);
        self.bus.publish(BoardEvent::SessionStarted {
            item_id: entity.item_id().to_string(),
            drag_kind: entity.kind,
            origin_group: entity.origin_group.clone(),
        });
        self.state = SessionState::Active(ActiveDrag {
            entity,
            hover: None,
            ejected_from_origin: false,
            placeholder_slot: None,
        });
    }

    /// Feed one pointer move: resolve the best target for the dragged
    /// rect and update hover plus origin-crossing state.
    ///
    /// The eject overlay signals are edge-triggered: leaving the origin
    /// group's footprint fires `EjectOverlayShown` exactly once, and only
    /// re-entering fires `EjectOverlayHidden`. Repeated moves on the same
    /// side are silent.
    pub fn update_hover<'a>(
        &mut self,
        dragged: Rect,
        targets: &'a [DropTarget],
        tuning: &HitTuning,
    ) -> Option<&'a DropTarget> {
        let SessionState::Active(drag) = &mut self.state else {
            return None;
        };
        let resolved = resolve_drop_target(
            drag.entity.kind,
            dragged,
            drag.entity.origin_group.as_deref(),
            targets,
            tuning,
        );

        let next_id = resolved.map(|t| t.id.clone());
        if drag.hover.as_ref().map(|h| &h.id) != next_id.as_ref() {
            self.bus.publish(BoardEvent::HoverChanged {
                item_id: drag.entity.item_id().to_string(),
                target_id: next_id,
            });
        }
        drag.hover = resolved.map(|t| HoverTarget {
            id: t.id.clone(),
            kind: t.kind,
        });

        if drag.entity.kind == DragKind::GroupMember {
            if let Some(origin) = drag.entity.origin_group.clone() {
                let inside = drag.hover.as_ref().is_some_and(|h| h.id == origin);
                if !inside && !drag.ejected_from_origin {
                    drag.ejected_from_origin = true;
                    self.scroll.scroll_to_top();
                    self.bus
                        .publish(BoardEvent::EjectOverlayShown { group_id: origin });
                } else if inside && drag.ejected_from_origin {
                    drag.ejected_from_origin = false;
                    drag.placeholder_slot = None;
                    self.bus
                        .publish(BoardEvent::EjectOverlayHidden { group_id: origin });
                }
            }
        }

        resolved
    }

    /// Record which named insertion slot the pointer is over, if any.
    /// Only meaningful while a member drag is ejected from its origin.
    pub fn set_placeholder_slot(&mut self, slot: Option<PlaceholderSlot>) {
        if let SessionState::Active(drag) = &mut self.state {
            if slot.is_none() || drag.ejected_from_origin {
                drag.placeholder_slot = slot;
            }
        }
    }

    /// Render sequence for the top-level grid: the layout with the
    /// transient placeholder inserted while one is being projected.
    pub fn projected_layout(&self, layout: &[DashboardItem]) -> Vec<DashboardItem> {
        if let SessionState::Active(drag) = &self.state {
            if drag.ejected_from_origin {
                if let (Some(origin), Some(slot)) =
                    (drag.entity.origin_group.as_deref(), drag.placeholder_slot)
                {
                    if let Some(projected) = projector::project(layout, origin, slot) {
                        return projected;
                    }
                }
            }
        }
        layout.to_vec()
    }

    /// Finish the session: classify the drop into exactly one action,
    /// dispatch it, signal, and drop to idle.
    pub fn end(&mut self, store: &mut LayoutStore, viewport: Viewport) -> SessionOutcome {
        let SessionState::Active(drag) = std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            tracing::debug!("Drag end with no active session");
            self.reset_to_idle();
            return SessionOutcome::unchanged();
        };
        let applied = classify(&drag);
        let changed = applied
            .as_ref()
            .map(|action| store.dispatch(viewport, action))
            .unwrap_or(false);
        self.bus.publish(BoardEvent::SessionEnded {
            item_id: drag.entity.item_id().to_string(),
            applied: applied.clone(),
        });
        self.reset_to_idle();
        SessionOutcome { applied, changed }
    }

    /// Commit a drop released directly onto an open group's internal
    /// area, bypassing collision resolution.
    pub fn explicit_group_drop(
        &mut self,
        store: &mut LayoutStore,
        viewport: Viewport,
        group_id: &str,
    ) -> SessionOutcome {
        let SessionState::Active(drag) = std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            tracing::debug!("Explicit group drop with no active session");
            self.reset_to_idle();
            return SessionOutcome::unchanged();
        };
        let item_id = drag.entity.item_id().to_string();
        let applied = if drag.entity.kind == DragKind::AppShortcut {
            Some(LayoutAction::MoveIntoGroup {
                group_id: group_id.to_string(),
                item_id: item_id.clone(),
            })
        } else {
            tracing::debug!(
                "Explicit group drop ignored for {:?} entity",
                drag.entity.kind
            );
            None
        };
        if applied.is_some() {
            self.bus.publish(BoardEvent::ExplicitGroupDrop {
                group_id: group_id.to_string(),
                item_id: item_id.clone(),
            });
        }
        let changed = applied
            .as_ref()
            .map(|action| store.dispatch(viewport, action))
            .unwrap_or(false);
        self.bus.publish(BoardEvent::SessionEnded {
            item_id,
            applied: applied.clone(),
        });
        self.reset_to_idle();
        SessionOutcome { applied, changed }
    }

    /// Defensive reset: broadcast `ForceInactive` and drop to idle with
    /// zero mutation. Safe to call at any time, active session or not.
    pub fn force_inactive(&mut self) {
        self.bus.publish(BoardEvent::ForceInactive);
        self.reset_to_idle();
    }

    /// Idempotent idle reset. Always releases the scroll lock, because a
    /// clean drag-end cannot be guaranteed on every input device.
    fn reset_to_idle(&mut self) {
        self.scroll.set_scroll_locked(false);
        self.state = SessionState::Idle;
    }
}

/// Map the finished drag onto at most one layout action.
///
/// The classification set is closed: member-to-dashboard, app-to-group,
/// reorder, or no-change. Each terminal state lands in exactly one arm.
fn classify(drag: &ActiveDrag) -> Option<LayoutAction> {
    let item_id = drag.entity.item_id();
    match drag.entity.kind {
        DragKind::GroupMember => {
            let origin = drag.entity.origin_group.as_ref()?;
            if drag.ejected_from_origin {
                Some(LayoutAction::MoveOutOfGroup {
                    group_id: origin.clone(),
                    member_id: item_id.to_string(),
                })
            } else {
                None
            }
        }
        DragKind::AppShortcut => {
            let hover = drag.hover.as_ref()?;
            match hover.kind {
                TargetKind::GroupContainer { .. } => Some(LayoutAction::MoveIntoGroup {
                    group_id: hover.id.clone(),
                    item_id: item_id.to_string(),
                }),
                TargetKind::Ordinary if hover.id != item_id => Some(LayoutAction::Reorder {
                    from_id: item_id.to_string(),
                    to_id: hover.id.clone(),
                }),
                _ => None,
            }
        }
        DragKind::GroupWidget | DragKind::Other => {
            let hover = drag.hover.as_ref()?;
            if hover.id != item_id && hover.id != PLACEHOLDER_ID {
                Some(LayoutAction::Reorder {
                    from_id: item_id.to_string(),
                    to_id: hover.id.clone(),
                })
            } else {
                None
            }
        }
        // The placeholder is render-only; its drag never commits.
        DragKind::Placeholder => None,
    }
}

/// Build typed drop targets from plain measured cells.
///
/// Surfaces report `(id, rect)` pairs straight off the DOM; the board
/// decides what each id is. Top-level groups become containers with
/// their live capacity state, members of any group become internal
/// zones, and everything else (the placeholder included) is an ordinary
/// reorder slot. Cells for ids the board no longer knows are dropped.
pub fn targets_for_layout(layout: &[DashboardItem], cells: &[(String, Rect)]) -> Vec<DropTarget> {
    cells
        .iter()
        .filter_map(|(id, rect)| {
            if id == PLACEHOLDER_ID {
                return Some(DropTarget::new(id.clone(), TargetKind::Ordinary, *rect));
            }
            if let Some(item) = find_item(layout, id) {
                let kind = match item.config.as_group() {
                    Some(group) => TargetKind::GroupContainer {
                        at_capacity: group.at_capacity(),
                    },
                    None => TargetKind::Ordinary,
                };
                return Some(DropTarget::new(id.clone(), kind, *rect));
            }
            let is_member = layout
                .iter()
                .filter_map(|item| item.config.as_group())
                .any(|group| group.items.iter().any(|m| &m.id == id));
            if is_member {
                Some(DropTarget::new(id.clone(), TargetKind::GroupInternal, *rect))
            } else {
                tracing::debug!("Dropping measured cell for unknown id {}", id);
                None
            }
        })
        .collect()
}
