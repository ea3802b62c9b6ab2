use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    TagGroup,
    EntityLeaf,
}

/// A render-ready node. The renderer draws cards from these and nothing
/// else; the engine never touches a drawing surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    /// Tree-unique id; cross-seed clones carry a `seed::entity` form.
    pub id: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    /// Tag label for groups, title for entity cards.
    pub label: String,
    /// Underlying entity id (un-namespaced), for entity cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_ref: Option<String>,
    /// Tag chips not consumed by an ancestor branch label.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_tags: Vec<String>,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub is_seed: bool,
}

/// Connector geometry between a parent and one child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgePath {
    /// Smooth orthogonal connector straight between the endpoints.
    Direct,
    /// Travel vertically to the shared line at `y`, horizontally to
    /// `x` just left of the target card, then down into the target.
    OverRoute { x: f32, y: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub color: String,
    pub path: EdgePath,
}

/// The complete result of one engine invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<RoutedEdge>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
