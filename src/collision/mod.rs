//! Drop-target resolution for an in-flight drag.
//!
//! Pure geometry: given the dragged rectangle and the registered droppable
//! targets, pick the single best target id for this frame. The strategy
//! branches on what is being dragged; shortcut-like entities use coverage
//! scoring with a deliberately generous group hit-test, while container and
//! opaque-widget reorders use nearest-rectangle selection.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// What the active drag entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragKind {
    /// A top-level app shortcut.
    AppShortcut,
    /// A shortcut living inside a group container.
    GroupMember,
    /// A group container itself being reordered among its siblings.
    GroupWidget,
    /// The transient render-only slot shown while hovering a group edge.
    Placeholder,
    /// Any other opaque widget.
    Other,
}

/// Semantic role of a registered droppable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A group widget's outer cell, able to absorb shortcut-like drops.
    GroupContainer { at_capacity: bool },
    /// A drop zone inside an open group overlay.
    GroupInternal,
    /// A plain reorder slot.
    Ordinary,
}

/// One registered droppable region for the current frame.
#[derive(Debug, Clone)]
pub struct DropTarget {
    pub id: String,
    pub kind: TargetKind,
    pub rect: Rect,
}

impl DropTarget {
    pub fn new(id: impl Into<String>, kind: TargetKind, rect: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            rect,
        }
    }
}

/// Hit-test tuning constants.
///
/// The values are empirically tuned; group containers get a more generous
/// test than ordinary reorder slots because a missed group drop is more
/// disruptive than an imprecise reorder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTuning {
    /// Outward expansion of a group container rect before the center test.
    pub group_hit_margin_px: f64,
    /// Minimum coverage for a group container hit outside the margin zone.
    pub group_coverage_min: f64,
    /// Minimum coverage for ordinary and group-internal targets.
    pub reorder_coverage_min: f64,
}

impl Default for HitTuning {
    fn default() -> Self {
        Self {
            group_hit_margin_px: 10.0,
            group_coverage_min: 0.3,
            reorder_coverage_min: 0.5,
        }
    }
}

/// Pick the best drop target for the dragged rectangle, or `None`.
///
/// `origin_group` is the id of the group the entity is being dragged out of,
/// if any. A full group is never offered as a target, except the origin
/// group itself: the dragged member still counts against its capacity, and
/// hover tracking over the origin must keep working so the eject overlay
/// can toggle.
///
/// Degenerate geometry (zero-area or not-yet-measured rects) never scores;
/// an unmeasurable dragged rect resolves to `None`.
pub fn resolve_drop_target<'a>(
    drag_kind: DragKind,
    dragged: Rect,
    origin_group: Option<&str>,
    targets: &'a [DropTarget],
    tuning: &HitTuning,
) -> Option<&'a DropTarget> {
    if !dragged.is_measurable() {
        return None;
    }
    match drag_kind {
        DragKind::AppShortcut | DragKind::GroupMember | DragKind::Placeholder => {
            best_by_coverage(dragged, origin_group, targets, tuning)
        }
        DragKind::GroupWidget => nearest_by_center(dragged, targets),
        DragKind::Other => nearest_by_corners(dragged, targets),
    }
}

/// Coverage scoring over all targets. Group containers hit on either the
/// expanded-rect center test (score 1.0) or `coverage > group_coverage_min`;
/// everything else needs `coverage > reorder_coverage_min`. Ties keep the
/// first candidate in registration order.
fn best_by_coverage<'a>(
    dragged: Rect,
    origin_group: Option<&str>,
    targets: &'a [DropTarget],
    tuning: &HitTuning,
) -> Option<&'a DropTarget> {
    let mut best: Option<(&DropTarget, f64)> = None;
    for target in targets {
        if !target.rect.is_measurable() {
            continue;
        }
        let score = match target.kind {
            TargetKind::GroupContainer { at_capacity } => {
                if at_capacity && origin_group != Some(target.id.as_str()) {
                    continue;
                }
                if target
                    .rect
                    .expand(tuning.group_hit_margin_px)
                    .contains(dragged.center())
                {
                    1.0
                } else {
                    let coverage = coverage_of(dragged, target.rect);
                    if coverage > tuning.group_coverage_min {
                        coverage
                    } else {
                        continue;
                    }
                }
            }
            TargetKind::GroupInternal | TargetKind::Ordinary => {
                let coverage = coverage_of(dragged, target.rect);
                if coverage > tuning.reorder_coverage_min {
                    coverage
                } else {
                    continue;
                }
            }
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((target, score)),
        }
    }
    best.map(|(target, _)| target)
}

/// Fraction of the dragged rect covered by the target.
fn coverage_of(dragged: Rect, target: Rect) -> f64 {
    dragged.intersection_area(target) / dragged.area()
}

/// Nearest center-to-center distance, skipping group-internal zones so a
/// container being reordered can never be captured by internal drop zones.
fn nearest_by_center<'a>(dragged: Rect, targets: &'a [DropTarget]) -> Option<&'a DropTarget> {
    let center = dragged.center();
    let mut best: Option<(&DropTarget, f64)> = None;
    for target in targets {
        if matches!(target.kind, TargetKind::GroupInternal) || !target.rect.is_measurable() {
            continue;
        }
        let distance = center.distance(target.rect.center());
        match best {
            Some((_, nearest)) if distance >= nearest => {}
            _ => best = Some((target, distance)),
        }
    }
    best.map(|(target, _)| target)
}

/// Nearest mean corner-to-corresponding-corner distance, with the same
/// group-internal exclusion as `nearest_by_center`.
fn nearest_by_corners<'a>(dragged: Rect, targets: &'a [DropTarget]) -> Option<&'a DropTarget> {
    let corners = dragged.corners();
    let mut best: Option<(&DropTarget, f64)> = None;
    for target in targets {
        if matches!(target.kind, TargetKind::GroupInternal) || !target.rect.is_measurable() {
            continue;
        }
        let distance: f64 = corners
            .iter()
            .zip(target.rect.corners())
            .map(|(a, b)| a.distance(b))
            .sum::<f64>()
            / 4.0;
        match best {
            Some((_, nearest)) if distance >= nearest => {}
            _ => best = Some((target, distance)),
        }
    }
    best.map(|(target, _)| target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, w, h)
    }

    fn group(id: &str, r: Rect) -> DropTarget {
        DropTarget::new(id, TargetKind::GroupContainer { at_capacity: false }, r)
    }

    fn full_group(id: &str, r: Rect) -> DropTarget {
        DropTarget::new(id, TargetKind::GroupContainer { at_capacity: true }, r)
    }

    fn slot(id: &str, r: Rect) -> DropTarget {
        DropTarget::new(id, TargetKind::Ordinary, r)
    }

    fn internal(id: &str, r: Rect) -> DropTarget {
        DropTarget::new(id, TargetKind::GroupInternal, r)
    }

    #[test]
    fn shortcut_hits_group_via_expanded_margin() {
        // Dragged center (105, 50) sits off the group's right edge but
        // inside the 10px margin band.
        let targets = vec![group("g", rect(0.0, 0.0, 100.0, 100.0))];
        let dragged = rect(85.0, 30.0, 40.0, 40.0);
        let hit = resolve_drop_target(
            DragKind::AppShortcut,
            dragged,
            None,
            &targets,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("g"));
    }

    #[test]
    fn group_coverage_threshold_is_more_generous_than_ordinary() {
        let tuning = HitTuning::default();
        let zone = rect(0.0, 0.0, 100.0, 100.0);
        // 35% overlap with the dragged center outside the margin band:
        // enough for a group container, not for a plain slot.
        let dragged = rect(65.0, 0.0, 100.0, 100.0);
        let coverage = dragged.intersection_area(zone) / dragged.area();
        assert!(coverage > 0.3 && coverage < 0.5);
        assert!(!zone
            .expand(tuning.group_hit_margin_px)
            .contains(dragged.center()));

        let as_group = vec![group("g", zone)];
        let as_slot = vec![slot("s", zone)];
        assert_eq!(
            resolve_drop_target(DragKind::AppShortcut, dragged, None, &as_group, &tuning)
                .map(|t| t.id.as_str()),
            Some("g")
        );
        assert!(
            resolve_drop_target(DragKind::AppShortcut, dragged, None, &as_slot, &tuning).is_none()
        );

        // Push the overlap below 0.3 and the group no longer hits either.
        let dragged = rect(75.0, 0.0, 100.0, 100.0);
        assert!(
            resolve_drop_target(DragKind::AppShortcut, dragged, None, &as_group, &tuning)
                .is_none()
        );
    }

    #[test]
    fn ordinary_slot_needs_majority_coverage() {
        let targets = vec![slot("s", rect(0.0, 0.0, 100.0, 100.0))];
        let tuning = HitTuning::default();
        // 60% covered.
        let hit = resolve_drop_target(
            DragKind::AppShortcut,
            rect(40.0, 0.0, 100.0, 100.0),
            None,
            &targets,
            &tuning,
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("s"));
        // Exactly 50% is not strictly greater, so no hit.
        assert!(resolve_drop_target(
            DragKind::AppShortcut,
            rect(50.0, 0.0, 100.0, 100.0),
            None,
            &targets,
            &tuning,
        )
        .is_none());
    }

    #[test]
    fn full_group_is_skipped_unless_it_is_the_origin() {
        let targets = vec![full_group("g", rect(0.0, 0.0, 100.0, 100.0))];
        let dragged = rect(25.0, 25.0, 50.0, 50.0);
        assert!(resolve_drop_target(
            DragKind::AppShortcut,
            dragged,
            None,
            &targets,
            &HitTuning::default(),
        )
        .is_none());
        // A member dragged within its own full group still resolves it.
        let hit = resolve_drop_target(
            DragKind::GroupMember,
            dragged,
            Some("g"),
            &targets,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("g"));
    }

    #[test]
    fn highest_coverage_wins_and_ties_keep_first() {
        let targets = vec![
            slot("left", rect(0.0, 0.0, 100.0, 100.0)),
            slot("right", rect(40.0, 0.0, 100.0, 100.0)),
        ];
        let hit = resolve_drop_target(
            DragKind::AppShortcut,
            rect(35.0, 0.0, 100.0, 100.0),
            None,
            &targets,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("right"));

        let mirrored = vec![
            slot("a", rect(0.0, 0.0, 100.0, 100.0)),
            slot("b", rect(0.0, 0.0, 100.0, 100.0)),
        ];
        let hit = resolve_drop_target(
            DragKind::AppShortcut,
            rect(10.0, 10.0, 100.0, 100.0),
            None,
            &mirrored,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn group_widget_uses_nearest_center_and_ignores_internal_zones() {
        let targets = vec![
            internal("inside", rect(95.0, 95.0, 20.0, 20.0)),
            slot("far", rect(400.0, 0.0, 100.0, 100.0)),
            slot("near", rect(120.0, 0.0, 100.0, 100.0)),
        ];
        let hit = resolve_drop_target(
            DragKind::GroupWidget,
            rect(100.0, 0.0, 100.0, 100.0),
            None,
            &targets,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("near"));
    }

    #[test]
    fn other_widget_uses_nearest_corners() {
        // Corner distances favor the slot hugging the dragged rect's right
        // edge even though center distances are equal.
        let targets = vec![
            internal("inside", rect(100.0, 0.0, 100.0, 100.0)),
            slot("tall", rect(200.0, -200.0, 100.0, 500.0)),
            slot("tight", rect(200.0, 0.0, 100.0, 100.0)),
        ];
        let hit = resolve_drop_target(
            DragKind::Other,
            rect(100.0, 0.0, 100.0, 100.0),
            None,
            &targets,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("tight"));
    }

    #[test]
    fn degenerate_geometry_never_matches() {
        let targets = vec![
            group("g", rect(0.0, 0.0, 100.0, 100.0)),
            slot("s", rect(0.0, 0.0, 0.0, 0.0)),
        ];
        assert!(resolve_drop_target(
            DragKind::AppShortcut,
            rect(0.0, 0.0, 0.0, 0.0),
            None,
            &targets,
            &HitTuning::default(),
        )
        .is_none());
        assert!(resolve_drop_target(
            DragKind::GroupWidget,
            Rect::new(f64::NAN, 0.0, 10.0, 10.0),
            None,
            &targets,
            &HitTuning::default(),
        )
        .is_none());
        // The zero-area slot is skipped, never a division-by-zero.
        let hit = resolve_drop_target(
            DragKind::AppShortcut,
            rect(10.0, 10.0, 50.0, 50.0),
            None,
            &targets,
            &HitTuning::default(),
        );
        assert_eq!(hit.map(|t| t.id.as_str()), Some("g"));
    }

    #[test]
    fn kebab_case_wire_names_for_drag_kind() {
        assert_eq!(
            serde_json::to_string(&DragKind::AppShortcut).unwrap(),
            "\"app-shortcut\""
        );
        assert_eq!(
            serde_json::from_str::<DragKind>("\"group-member\"").unwrap(),
            DragKind::GroupMember
        );
    }
}
