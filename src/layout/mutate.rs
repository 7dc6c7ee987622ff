//! Containment mutators: pure `layout -> layout'` functions.
//!
//! Every function clones the input and returns a fresh array; a group whose
//! contents changed always gets a fresh `items` vec so a concurrent render
//! never observes a half-applied edit. Missing ids degrade to a logged
//! no-op instead of an error, because these run inside pointer-event
//! handlers where an escaped error would strand the drag session.

use crate::layout::item::{
    find_group, find_index, generate_item_id, DashboardItem, GroupMember, ShortcutConfig,
    WidgetConfig,
};

/// Absorb a top-level item into a group container.
///
/// The member keeps the source's transferable fields but gets a fresh id;
/// the source item leaves the top level. A full group rejects the move
/// silently, as a second line of defense behind target resolution.
pub fn move_into_group(
    layout: &[DashboardItem],
    group_id: &str,
    source_item_id: &str,
) -> Vec<DashboardItem> {
    let mut next = layout.to_vec();
    let Some((group_index, group)) = find_group(&next, group_id) else {
        tracing::warn!("Move into group: group {} not found", group_id);
        return next;
    };
    if group.items.len() >= group.max_items {
        tracing::debug!("Move into group: group {} at capacity", group_id);
        return next;
    }
    let Some(source_index) = find_index(&next, source_item_id) else {
        tracing::warn!("Move into group: source item {} not found", source_item_id);
        return next;
    };
    if source_index == group_index {
        return next;
    }

    let source = next[source_index].clone();
    let (wol, health) = match &source.config {
        WidgetConfig::Shortcut(shortcut) => (shortcut.wol.clone(), shortcut.health.clone()),
        _ => (None, None),
    };
    let member = GroupMember {
        id: generate_item_id(),
        name: source.label,
        url: source.url,
        icon: source.icon,
        show_label: source.show_label,
        admin_only: source.admin_only,
        wol,
        health,
    };

    if let Some(group) = next[group_index].config.as_group_mut() {
        let mut items = group.items.clone();
        items.push(member);
        group.items = items;
    }
    next.remove(source_index);
    next
}

/// Eject a group member back to the top level.
///
/// The new top-level item gets a fresh id and is inserted immediately after
/// the group's current index, keeping it visually adjacent to its origin.
pub fn move_out_of_group(
    layout: &[DashboardItem],
    group_id: &str,
    member_id: &str,
) -> Vec<DashboardItem> {
    let mut next = layout.to_vec();
    let Some((group_index, group)) = find_group(&next, group_id) else {
        tracing::warn!("Move out of group: group {} not found", group_id);
        return next;
    };
    let Some(member) = group.items.iter().find(|m| m.id == member_id).cloned() else {
        tracing::warn!("Move out of group: member {} not in group {}", member_id, group_id);
        return next;
    };

    let ejected = DashboardItem {
        id: generate_item_id(),
        label: member.name,
        url: member.url,
        icon: member.icon,
        show_label: member.show_label,
        admin_only: member.admin_only,
        config: WidgetConfig::Shortcut(ShortcutConfig {
            wol: member.wol,
            health: member.health,
        }),
    };

    if let Some(group) = next[group_index].config.as_group_mut() {
        group.items = group
            .items
            .iter()
            .filter(|m| m.id != member_id)
            .cloned()
            .collect();
    }
    next.insert(group_index + 1, ejected);
    next
}

/// Move `from_id` to `to_id`'s slot. No-op when either id is absent.
pub fn reorder(layout: &[DashboardItem], from_id: &str, to_id: &str) -> Vec<DashboardItem> {
    let mut next = layout.to_vec();
    let (Some(from), Some(to)) = (find_index(&next, from_id), find_index(&next, to_id)) else {
        tracing::debug!("Reorder skipped: {} or {} not found", from_id, to_id);
        return next;
    };
    let item = next.remove(from);
    next.insert(to, item);
    next
}

/// Drop one member from a group. Never touches the top-level ordering.
pub fn delete_group_item(
    layout: &[DashboardItem],
    group_id: &str,
    member_id: &str,
) -> Vec<DashboardItem> {
    let mut next = layout.to_vec();
    let Some((group_index, group)) = find_group(&next, group_id) else {
        tracing::warn!("Delete group item: group {} not found", group_id);
        return next;
    };
    if !group.items.iter().any(|m| m.id == member_id) {
        tracing::debug!("Delete group item: member {} not in group {}", member_id, group_id);
        return next;
    }
    if let Some(group) = next[group_index].config.as_group_mut() {
        group.items = group
            .items
            .iter()
            .filter(|m| m.id != member_id)
            .cloned()
            .collect();
    }
    next
}

/// Drop one top-level item. Never reaches into any group's members.
pub fn delete_top_level(layout: &[DashboardItem], item_id: &str) -> Vec<DashboardItem> {
    if find_index(layout, item_id).is_none() {
        tracing::debug!("Delete skipped: item {} not found", item_id);
    }
    layout
        .iter()
        .filter(|item| item.id != item_id)
        .cloned()
        .collect()
}

/// Deep-clone an item, fresh ids throughout, inserted right after the
/// original. Group clones also re-id every member.
pub fn duplicate(layout: &[DashboardItem], item_id: &str) -> Vec<DashboardItem> {
    let mut next = layout.to_vec();
    let Some(index) = find_index(&next, item_id) else {
        tracing::warn!("Duplicate skipped: item {} not found", item_id);
        return next;
    };
    let mut clone = next[index].clone();
    clone.id = generate_item_id();
    if let Some(group) = clone.config.as_group_mut() {
        group.items = group
            .items
            .iter()
            .map(|member| {
                let mut member = member.clone();
                member.id = generate_item_id();
                member
            })
            .collect();
    }
    next.insert(index + 1, clone);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::item::{count_items, id_in_use, GroupConfig};

    fn member(id: &str, name: &str) -> GroupMember {
        GroupMember {
            id: id.into(),
            name: name.into(),
            url: Some(format!("http://{name}")),
            icon: None,
            show_label: true,
            admin_only: false,
            wol: None,
            health: None,
        }
    }

    fn group_with(id: &str, members: Vec<GroupMember>, max_items: usize) -> DashboardItem {
        let mut item = DashboardItem::group("Media");
        item.id = id.into();
        item.config = WidgetConfig::Group(GroupConfig {
            items: members,
            max_items,
        });
        item
    }

    fn shortcut(id: &str, label: &str) -> DashboardItem {
        let mut item = DashboardItem::shortcut(label, format!("http://{label}"));
        item.id = id.into();
        item
    }

    fn sample_layout() -> Vec<DashboardItem> {
        vec![
            shortcut("a", "Sonarr"),
            group_with("b", vec![member("g1", "Radarr")], 3),
            shortcut("c", "Jellyfin"),
        ]
    }

    #[test]
    fn move_into_group_regenerates_id_and_keeps_fields() {
        let layout = sample_layout();
        let next = move_into_group(&layout, "b", "c");

        assert_eq!(next.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        let group = next[1].config.as_group().unwrap();
        assert_eq!(group.items.len(), 2);
        let absorbed = &group.items[1];
        assert_eq!(absorbed.name, "Jellyfin");
        assert_eq!(absorbed.url.as_deref(), Some("http://Jellyfin"));
        assert_ne!(absorbed.id, "c");
        assert!(!id_in_use(&next, "c"));
        // Net item count is unchanged by a move.
        assert_eq!(count_items(&next), count_items(&layout));
        // Input untouched.
        assert_eq!(layout.len(), 3);
        assert_eq!(layout[1].config.as_group().unwrap().items.len(), 1);
    }

    #[test]
    fn move_into_full_group_is_rejected_silently() {
        let layout = vec![
            shortcut("a", "Sonarr"),
            group_with(
                "b",
                vec![member("g1", "x"), member("g2", "y"), member("g3", "z")],
                3,
            ),
        ];
        let next = move_into_group(&layout, "b", "a");
        assert_eq!(next, layout);
    }

    #[test]
    fn move_into_missing_group_is_a_no_op() {
        let layout = sample_layout();
        assert_eq!(move_into_group(&layout, "nope", "c"), layout);
        assert_eq!(move_into_group(&layout, "b", "nope"), layout);
    }

    #[test]
    fn move_out_inserts_right_after_group_with_fresh_id() {
        let layout = sample_layout();
        let next = move_out_of_group(&layout, "b", "g1");

        assert_eq!(next.len(), 4);
        assert_eq!(next[1].id, "b");
        let ejected = &next[2];
        assert_eq!(ejected.label, "Radarr");
        assert_eq!(ejected.url.as_deref(), Some("http://Radarr"));
        assert_ne!(ejected.id, "g1");
        assert!(matches!(ejected.config, WidgetConfig::Shortcut(_)));
        assert!(next[1].config.as_group().unwrap().items.is_empty());
        assert!(!id_in_use(&next, "g1"));
        assert_eq!(count_items(&next), count_items(&layout));
    }

    #[test]
    fn sequential_ejections_track_the_group_index() {
        let layout = vec![group_with(
            "b",
            vec![member("g1", "x"), member("g2", "y")],
            3,
        )];
        let once = move_out_of_group(&layout, "b", "g1");
        assert_eq!(once[0].id, "b");
        assert_eq!(once[1].label, "x");

        let twice = move_out_of_group(&once, "b", "g2");
        // The second ejection lands right after the group, ahead of the
        // first ejected item, not at the end.
        assert_eq!(twice[0].id, "b");
        assert_eq!(twice[1].label, "y");
        assert_eq!(twice[2].label, "x");
    }

    #[test]
    fn reorder_moves_to_target_slot() {
        let layout = sample_layout();
        let next = reorder(&layout, "c", "a");
        assert_eq!(next.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), ["c", "a", "b"]);
        // Ids untouched by a reorder.
        assert!(id_in_use(&next, "g1"));

        let forward = reorder(&layout, "a", "c");
        assert_eq!(
            forward.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            ["b", "c", "a"]
        );
    }

    #[test]
    fn reorder_with_missing_id_is_a_no_op() {
        let layout = sample_layout();
        assert_eq!(reorder(&layout, "nope", "a"), layout);
        assert_eq!(reorder(&layout, "a", "nope"), layout);
        assert_eq!(reorder(&layout, "a", "a"), layout);
    }

    #[test]
    fn delete_group_item_leaves_top_level_alone() {
        let layout = sample_layout();
        let next = delete_group_item(&layout, "b", "g1");
        assert_eq!(
            next.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            ["a", "b", "c"]
        );
        assert!(next[1].config.as_group().unwrap().items.is_empty());
        assert_eq!(count_items(&next), count_items(&layout) - 1);
    }

    #[test]
    fn delete_top_level_leaves_groups_alone() {
        let layout = sample_layout();
        let next = delete_top_level(&layout, "a");
        assert_eq!(next.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(next[0].config.as_group().unwrap().items.len(), 1);
        assert_eq!(count_items(&next), count_items(&layout) - 1);
    }

    #[test]
    fn duplicate_reissues_every_id() {
        let layout = sample_layout();
        let next = duplicate(&layout, "b");
        assert_eq!(next.len(), 4);
        let clone = &next[2];
        assert_eq!(clone.label, next[1].label);
        assert_ne!(clone.id, "b");
        let members = &clone.config.as_group().unwrap().items;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Radarr");
        assert_ne!(members[0].id, "g1");
        assert_eq!(count_items(&next), count_items(&layout) + 2);
    }
}
