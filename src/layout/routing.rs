use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::tree::TreeNode;

use super::position::Placement;
use super::types::{EdgePath, PositionedNode, RoutedEdge};

/// Computes connector paths for every parent→child pair in the forest.
///
/// Children of a multi-column group are reached via a shared horizontal
/// travel line above all cards in the group, so edges never cross a
/// sibling card body; everything else connects directly.
pub(crate) fn route_forest(
    forest: &[TreeNode],
    placement: &Placement,
    config: &LayoutConfig,
) -> Vec<RoutedEdge> {
    let index: HashMap<&str, &PositionedNode> = placement
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();
    let mut edges = Vec::new();
    for root in forest {
        route_node(root, placement, &index, config, &mut edges);
    }
    edges
}

fn route_node(
    node: &TreeNode,
    placement: &Placement,
    index: &HashMap<&str, &PositionedNode>,
    config: &LayoutConfig,
    edges: &mut Vec<RoutedEdge>,
) {
    let travel_y = placement.travel_lines.get(node.id()).copied();
    for child in node.children() {
        // Group edges carry the branch color; edges leaving a root or
        // seed card take each child's own color so every thematic
        // branch stays traceable by color alone.
        let color = match node {
            TreeNode::Group(group) => group.color.clone(),
            TreeNode::Entity(_) => child_color(child),
        };
        let path = match travel_y {
            Some(y) => {
                let child_x = index.get(child.id()).map(|n| n.x).unwrap_or(0.0);
                EdgePath::OverRoute {
                    x: child_x - config.routing.entry_inset,
                    y,
                }
            }
            None => EdgePath::Direct,
        };
        edges.push(RoutedEdge {
            id: format!("e-{}-{}", node.id(), child.id()),
            from_id: node.id().to_string(),
            to_id: child.id().to_string(),
            color,
            path,
        });
        route_node(child, placement, index, config, edges);
    }
}

fn child_color(child: &TreeNode) -> String {
    match child {
        TreeNode::Group(group) => group.color.clone(),
        TreeNode::Entity(entity) => entity.color.clone(),
    }
}
