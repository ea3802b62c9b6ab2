use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Tree construction knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum tag-branch depth below a root/seed.
    pub max_depth: usize,
    /// Minimum candidate support for a tag to form a group.
    pub min_group_size: usize,
    /// Label for the consolidated leftover bucket.
    pub other_label: String,
    /// Label for the branch holding entities unreachable from any seed.
    pub orphan_label: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_group_size: 2,
            other_label: "other".to_string(),
            orphan_label: "Other Recommendations".to_string(),
        }
    }
}

/// Card geometry. The renderer draws entity cards with a title band and
/// up to `max_new_tags` tag chips laid out `chips_per_row` per row; the
/// base height already covers two chip rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub group_height: f32,
    pub leaf_base_height: f32,
    pub tag_row_height: f32,
    pub chips_per_row: usize,
    pub max_new_tags: usize,
    pub card_width: f32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            group_height: 44.0,
            leaf_base_height: 96.0,
            tag_row_height: 22.0,
            chips_per_row: 2,
            max_new_tags: 4,
            card_width: 240.0,
        }
    }
}

/// Multi-column arrangement for all-leaf groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Vertical space reserved above the first card row; hosts the
    /// over-route travel line and the group card itself.
    pub clearance: f32,
    pub row_gap: f32,
    pub column_gap: f32,
    pub rows_per_column: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            clearance: 70.0,
            row_gap: 18.0,
            column_gap: 28.0,
            rows_per_column: 2,
        }
    }
}

/// Connector routing knobs. Defaults keep `over_route_gap +
/// group_height / 2 <= clearance` so a column parent centered on the
/// travel line stays inside its subtree span.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Distance between the travel line and the first card row.
    pub over_route_gap: f32,
    /// Horizontal inset left of a card where an over-routed edge drops
    /// down before entering the card left-to-right.
    pub entry_inset: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            over_route_gap: 24.0,
            entry_inset: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between consecutive tree depths.
    pub level_step: f32,
    /// Vertical gap between sibling subtrees.
    pub sibling_gap: f32,
    /// Vertical gap between forest roots (seed trees, orphan branch).
    pub forest_gap: f32,
    pub tree: TreeConfig,
    pub card: CardConfig,
    pub column: ColumnConfig,
    pub routing: RoutingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_step: 320.0,
            sibling_gap: 24.0,
            forest_gap: 80.0,
            tree: TreeConfig::default(),
            card: CardConfig::default(),
            column: ColumnConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

/// Load a configuration file; `None` yields the defaults. Every field
/// in the file is optional and overrides the default in place.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}
