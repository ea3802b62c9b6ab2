use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::layout::{EdgePath, Layout, NodeKind};

/// Flat, render-agnostic JSON view of a computed layout, for debugging
/// and golden files.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub label: String,
    pub entity_ref: Option<String>,
    pub new_tags: Vec<String>,
    pub is_root: bool,
    pub is_seed: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub color: String,
    pub path: String,
    pub over_route: Option<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: match node.kind {
                    NodeKind::TagGroup => "tagGroup".to_string(),
                    NodeKind::EntityLeaf => "entityLeaf".to_string(),
                },
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                color: node.color.clone(),
                label: node.label.clone(),
                entity_ref: node.entity_ref.clone(),
                new_tags: node.new_tags.clone(),
                is_root: node.is_root,
                is_seed: node.is_seed,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| {
                let (path, over_route) = match edge.path {
                    EdgePath::Direct => ("direct".to_string(), None),
                    EdgePath::OverRoute { x, y } => ("over-route".to_string(), Some([x, y])),
                };
                EdgeDump {
                    id: edge.id.clone(),
                    from: edge.from_id.clone(),
                    to: edge.to_id.clone(),
                    color: edge.color.clone(),
                    path,
                    over_route,
                }
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
