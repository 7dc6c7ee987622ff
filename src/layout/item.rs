//! Board data model: dashboard items, group members, per-viewport layouts.
//!
//! The engine only interprets the containment-relevant parts of an item's
//! config (a group's member list and capacity, a shortcut's transferable
//! fields). Everything else rides along as an opaque bag for external
//! widget renderers.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated item ids.
const ITEM_ID_LEN: usize = 10;

/// Generate a fresh random item id.
///
/// Ids are regenerated whenever an item crosses a containment boundary
/// (dashboard → group or group → dashboard), so an id never outlives the
/// array that owns it.
pub fn generate_item_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ITEM_ID_LEN)
        .map(char::from)
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_max_items() -> usize {
    6
}

/// Wake-on-LAN settings carried by shortcuts and group members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeOnLan {
    pub mac_address: String,
    #[serde(default)]
    pub broadcast_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Health-check settings carried by shortcuts and group members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub expected_status: Option<u16>,
}

/// Per-shortcut config beyond the common item fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    #[serde(default)]
    pub wol: Option<WakeOnLan>,
    #[serde(default)]
    pub health: Option<HealthCheck>,
}

/// A shortcut-like item living inside a group container.
///
/// Member ids are unique only within their owning group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub show_label: bool,
    #[serde(default)]
    pub admin_only: bool,
    #[serde(default)]
    pub wol: Option<WakeOnLan>,
    #[serde(default)]
    pub health: Option<HealthCheck>,
}

/// Group container config: a capacity-bounded member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub items: Vec<GroupMember>,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            max_items: default_max_items(),
        }
    }
}

impl GroupConfig {
    pub fn at_capacity(&self) -> bool {
        self.items.len() >= self.max_items
    }
}

/// Opaque config for an externally rendered widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    /// Renderer name, e.g. "weather" or "calendar". The engine never
    /// interprets it.
    pub widget: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// Widget behavior tag plus its config payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "kebab-case")]
pub enum WidgetConfig {
    Shortcut(ShortcutConfig),
    Group(GroupConfig),
    Widget(WidgetSpec),
}

impl WidgetConfig {
    pub fn is_group(&self) -> bool {
        matches!(self, WidgetConfig::Group(_))
    }

    pub fn as_group(&self) -> Option<&GroupConfig> {
        match self {
            WidgetConfig::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupConfig> {
        match self {
            WidgetConfig::Group(group) => Some(group),
            _ => None,
        }
    }
}

/// A top-level board item: one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub show_label: bool,
    #[serde(default)]
    pub admin_only: bool,
    pub config: WidgetConfig,
}

impl DashboardItem {
    /// New app shortcut with a fresh id.
    pub fn shortcut(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: generate_item_id(),
            label: label.into(),
            url: Some(url.into()),
            icon: None,
            show_label: true,
            admin_only: false,
            config: WidgetConfig::Shortcut(ShortcutConfig::default()),
        }
    }

    /// New empty group container with a fresh id.
    pub fn group(label: impl Into<String>) -> Self {
        Self {
            id: generate_item_id(),
            label: label.into(),
            url: None,
            icon: None,
            show_label: true,
            admin_only: false,
            config: WidgetConfig::Group(GroupConfig::default()),
        }
    }

    /// New opaque widget with a fresh id.
    pub fn widget(label: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            id: generate_item_id(),
            label: label.into(),
            url: None,
            icon: None,
            show_label: true,
            admin_only: false,
            config: WidgetConfig::Widget(WidgetSpec {
                widget: renderer.into(),
                options: serde_json::Value::Null,
            }),
        }
    }
}

/// Which device layout a mutation applies to.
///
/// The two layouts hold the same conceptual item set but are ordered
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Desktop,
    Mobile,
}

impl Viewport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Viewport::Desktop => "desktop",
            Viewport::Mobile => "mobile",
        }
    }
}

/// The whole persisted board: one item ordering per viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub desktop: Vec<DashboardItem>,
    #[serde(default)]
    pub mobile: Vec<DashboardItem>,
}

impl Board {
    pub fn layout(&self, viewport: Viewport) -> &[DashboardItem] {
        match viewport {
            Viewport::Desktop => &self.desktop,
            Viewport::Mobile => &self.mobile,
        }
    }

    pub fn set_layout(&mut self, viewport: Viewport, layout: Vec<DashboardItem>) {
        match viewport {
            Viewport::Desktop => self.desktop = layout,
            Viewport::Mobile => self.mobile = layout,
        }
    }

    /// Total item count across both viewports, group members included.
    pub fn total_items(&self) -> usize {
        count_items(&self.desktop) + count_items(&self.mobile)
    }
}

/// Starter board seeded on first run when the data dir holds no layout.
pub fn demo_board() -> Board {
    let mut media = DashboardItem::group("Media");
    if let Some(group) = media.config.as_group_mut() {
        group.items = vec![
            GroupMember {
                id: generate_item_id(),
                name: "Jellyfin".into(),
                url: Some("http://nas.local:8096".into()),
                icon: None,
                show_label: true,
                admin_only: false,
                wol: None,
                health: None,
            },
            GroupMember {
                id: generate_item_id(),
                name: "Navidrome".into(),
                url: Some("http://nas.local:4533".into()),
                icon: None,
                show_label: true,
                admin_only: false,
                wol: None,
                health: None,
            },
        ];
    }

    let desktop = vec![
        DashboardItem::shortcut("Home Assistant", "http://homeassistant.local:8123"),
        DashboardItem::shortcut("Router", "http://192.168.1.1"),
        media,
        DashboardItem::widget("Weather", "weather"),
    ];
    // Same items, independently ordered
    let mut mobile = desktop.clone();
    mobile.rotate_left(1);
    Board { desktop, mobile }
}

/// Item count of one layout, group members included.
pub fn count_items(layout: &[DashboardItem]) -> usize {
    layout
        .iter()
        .map(|item| 1 + item.config.as_group().map_or(0, |g| g.items.len()))
        .sum()
}

/// Whether `id` appears anywhere in the layout, members included.
pub fn id_in_use(layout: &[DashboardItem], id: &str) -> bool {
    layout.iter().any(|item| {
        item.id == id
            || item
                .config
                .as_group()
                .is_some_and(|g| g.items.iter().any(|m| m.id == id))
    })
}

pub fn find_index(layout: &[DashboardItem], id: &str) -> Option<usize> {
    layout.iter().position(|item| item.id == id)
}

pub fn find_item<'a>(layout: &'a [DashboardItem], id: &str) -> Option<&'a DashboardItem> {
    layout.iter().find(|item| item.id == id)
}

/// Locate a group container by id, returning its index and config.
pub fn find_group<'a>(layout: &'a [DashboardItem], group_id: &str) -> Option<(usize, &'a GroupConfig)> {
    layout.iter().enumerate().find_map(|(index, item)| {
        if item.id == group_id {
            item.config.as_group().map(|g| (index, g))
        } else {
            None
        }
    })
}

/// Board invariant violation, raised only at the persistence-gateway
/// boundary. Internal mutators soft-fail instead.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("duplicate item id `{id}` in {scope}")]
    DuplicateId { id: String, scope: String },
    #[error("group `{group_id}` holds {len} items but max_items is {max}")]
    OverCapacity {
        group_id: String,
        len: usize,
        max: usize,
    },
}

/// Check id uniqueness per array and group capacity for both viewports.
///
/// Applied to externally supplied boards (API replace, file load); the
/// drag engine itself preserves these invariants by construction.
pub fn validate_board(board: &Board) -> Result<(), LayoutError> {
    validate_layout(&board.desktop, "desktop layout")?;
    validate_layout(&board.mobile, "mobile layout")?;
    Ok(())
}

fn validate_layout(layout: &[DashboardItem], scope: &str) -> Result<(), LayoutError> {
    let mut seen: Vec<&str> = Vec::with_capacity(layout.len());
    for item in layout {
        if seen.contains(&item.id.as_str()) {
            return Err(LayoutError::DuplicateId {
                id: item.id.clone(),
                scope: scope.to_string(),
            });
        }
        seen.push(&item.id);

        if let Some(group) = item.config.as_group() {
            if group.items.len() > group.max_items {
                return Err(LayoutError::OverCapacity {
                    group_id: item.id.clone(),
                    len: group.items.len(),
                    max: group.max_items,
                });
            }
            let mut member_ids: Vec<&str> = Vec::with_capacity(group.items.len());
            for member in &group.items {
                if member_ids.contains(&member.id.as_str()) {
                    return Err(LayoutError::DuplicateId {
                        id: member.id.clone(),
                        scope: format!("group `{}`", item.id),
                    });
                }
                member_ids.push(&member.id);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_sized() {
        let a = generate_item_id();
        let b = generate_item_id();
        assert_eq!(a.len(), ITEM_ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn widget_config_wire_format_is_adjacently_tagged() {
        let item = DashboardItem {
            id: "abc".into(),
            label: "Jellyfin".into(),
            url: Some("http://nas:8096".into()),
            icon: None,
            show_label: true,
            admin_only: false,
            config: WidgetConfig::Shortcut(ShortcutConfig::default()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["config"]["type"], "shortcut");
        assert!(json["config"]["options"].is_object());
    }

    #[test]
    fn group_defaults_apply_when_absent() {
        let json = r#"{"id":"g1","label":"Media","config":{"type":"group","options":{}}}"#;
        let item: DashboardItem = serde_json::from_str(json).unwrap();
        let group = item.config.as_group().unwrap();
        assert!(group.items.is_empty());
        assert_eq!(group.max_items, 6);
        assert!(item.show_label);
        assert!(!item.admin_only);
    }

    #[test]
    fn demo_board_passes_validation() {
        let board = demo_board();
        validate_board(&board).unwrap();
        assert_eq!(board.desktop.len(), board.mobile.len());
        assert_ne!(board.desktop[0].id, board.mobile[0].id);
    }

    #[test]
    fn validate_rejects_duplicate_top_level_ids() {
        let mut item = DashboardItem::shortcut("A", "http://a");
        item.id = "dup".into();
        let mut other = DashboardItem::shortcut("B", "http://b");
        other.id = "dup".into();
        let board = Board {
            desktop: vec![item, other],
            mobile: Vec::new(),
        };
        assert!(matches!(
            validate_board(&board),
            Err(LayoutError::DuplicateId { .. })
        ));
    }

    #[test]
    fn validate_rejects_overfull_group() {
        let mut group = DashboardItem::group("Media");
        if let Some(g) = group.config.as_group_mut() {
            g.max_items = 1;
            for n in 0..2 {
                g.items.push(GroupMember {
                    id: format!("m{n}"),
                    name: format!("member {n}"),
                    url: None,
                    icon: None,
                    show_label: true,
                    admin_only: false,
                    wol: None,
                    health: None,
                });
            }
        }
        let board = Board {
            desktop: vec![group],
            mobile: Vec::new(),
        };
        assert!(matches!(
            validate_board(&board),
            Err(LayoutError::OverCapacity { .. })
        ));
    }

    #[test]
    fn id_in_use_sees_group_members() {
        let mut group = DashboardItem::group("Media");
        if let Some(g) = group.config.as_group_mut() {
            g.items.push(GroupMember {
                id: "inner".into(),
                name: "Sonarr".into(),
                url: None,
                icon: None,
                show_label: true,
                admin_only: false,
                wol: None,
                health: None,
            });
        }
        let layout = vec![group];
        assert!(id_in_use(&layout, "inner"));
        assert!(!id_in_use(&layout, "elsewhere"));
    }
}
