pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod theme;
pub mod tree;

pub use config::{Config, LayoutConfig, load_config};
pub use ir::{Entity, FilterMode, Filters, Graph, MediaFilter, MediaKind, RelationEdge, Seeds};
pub use layout::{EdgePath, Layout, NodeKind, PositionedNode, RoutedEdge, compute_layout};
pub use theme::Theme;
