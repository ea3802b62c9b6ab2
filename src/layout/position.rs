use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::tree::TreeNode;

use super::types::{NodeKind, PositionedNode};

/// Node positions plus the over-route bookkeeping the router needs.
pub(crate) struct Placement {
    pub nodes: Vec<PositionedNode>,
    /// Multi-column group id -> shared travel line y.
    pub travel_lines: HashMap<String, f32>,
    pub width: f32,
    pub height: f32,
}

pub(crate) fn place_forest(forest: &[TreeNode], config: &LayoutConfig) -> Placement {
    let mut placement = Placement {
        nodes: Vec::new(),
        travel_lines: HashMap::new(),
        width: 0.0,
        height: 0.0,
    };
    let mut cursor = 0.0_f32;
    for root in forest {
        let height = subtree_height(root, config);
        place_node(root, 0, cursor, &mut placement, config);
        cursor += height + config.forest_gap;
    }
    let mut max_x = 0.0_f32;
    let mut max_y = 0.0_f32;
    for node in &placement.nodes {
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    placement.width = max_x.max(1.0);
    placement.height = max_y.max(1.0);
    placement
}

/// Entity cards grow by one chip row beyond the two rows the base
/// height already covers; tag groups are fixed-height pills.
pub(crate) fn node_height(node: &TreeNode, config: &LayoutConfig) -> f32 {
    match node {
        TreeNode::Group(_) => config.card.group_height,
        TreeNode::Entity(entity) => {
            let chips_per_row = config.card.chips_per_row.max(1);
            let rows = entity.new_tags.len().div_ceil(chips_per_row);
            let extra = rows.saturating_sub(2) as f32;
            config.card.leaf_base_height + extra * config.card.tag_row_height
        }
    }
}

/// A tag group whose ≥ 2 children are all childless entity cards
/// arranges them in columns instead of a vertical stack. Root and seed
/// cards always stack: centering a tall entity card on the travel line
/// would push it above its subtree span.
pub(crate) fn is_multi_column(node: &TreeNode, _config: &LayoutConfig) -> bool {
    let children = node.children();
    node.is_group() && children.len() >= 2 && children.iter().all(TreeNode::is_leaf)
}

pub(crate) fn subtree_height(node: &TreeNode, config: &LayoutConfig) -> f32 {
    let children = node.children();
    if children.is_empty() {
        return node_height(node, config);
    }
    if is_multi_column(node, config) {
        let row_height = max_child_height(children, config);
        let rows = children.len().min(config.column.rows_per_column) as f32;
        let occupied =
            config.column.clearance + rows * row_height + (rows - 1.0) * config.column.row_gap;
        return occupied.max(node_height(node, config));
    }
    let mut total = 0.0_f32;
    for child in children {
        total += subtree_height(child, config);
    }
    total += config.sibling_gap * (children.len() as f32 - 1.0);
    total.max(node_height(node, config))
}

fn max_child_height(children: &[TreeNode], config: &LayoutConfig) -> f32 {
    children
        .iter()
        .map(|child| node_height(child, config))
        .fold(0.0, f32::max)
}

fn place_node(
    node: &TreeNode,
    depth: usize,
    start_y: f32,
    placement: &mut Placement,
    config: &LayoutConfig,
) {
    let x = depth as f32 * config.level_step;
    let own_height = node_height(node, config);

    if is_multi_column(node, config) {
        let children = node.children();
        let row_height = max_child_height(children, config);
        let first_row_y = start_y + config.column.clearance;
        let travel_y = first_row_y - config.routing.over_route_gap;
        placement
            .travel_lines
            .insert(node.id().to_string(), travel_y);
        // The group card sits centered on the travel line, above every
        // card in its columns.
        placement
            .nodes
            .push(emit(node, x, travel_y - own_height / 2.0, own_height, config));
        let rows = config.column.rows_per_column.max(1);
        for (index, child) in children.iter().enumerate() {
            let column = index / rows;
            let row = index % rows;
            let child_x = (depth as f32 + 1.0) * config.level_step
                + column as f32 * (config.card.card_width + config.column.column_gap);
            let child_y = first_row_y + row as f32 * (row_height + config.column.row_gap);
            let child_height = node_height(child, config);
            placement
                .nodes
                .push(emit(child, child_x, child_y, child_height, config));
        }
        return;
    }

    let span = subtree_height(node, config);
    placement
        .nodes
        .push(emit(node, x, start_y + (span - own_height) / 2.0, own_height, config));
    let mut cursor = start_y;
    for child in node.children() {
        let child_span = subtree_height(child, config);
        place_node(child, depth + 1, cursor, placement, config);
        cursor += child_span + config.sibling_gap;
    }
}

fn emit(node: &TreeNode, x: f32, y: f32, height: f32, config: &LayoutConfig) -> PositionedNode {
    match node {
        TreeNode::Group(group) => PositionedNode {
            id: group.id.clone(),
            kind: NodeKind::TagGroup,
            x,
            y,
            width: config.card.card_width,
            height,
            color: group.color.clone(),
            label: group.label.clone(),
            entity_ref: None,
            new_tags: Vec::new(),
            is_root: false,
            is_seed: false,
        },
        TreeNode::Entity(entity) => PositionedNode {
            id: entity.id.clone(),
            kind: NodeKind::EntityLeaf,
            x,
            y,
            width: config.card.card_width,
            height,
            color: entity.color.clone(),
            label: entity.entity.title.clone(),
            entity_ref: Some(entity.entity.id.clone()),
            new_tags: entity.new_tags.clone(),
            is_root: entity.is_root,
            is_seed: entity.is_seed,
        },
    }
}
