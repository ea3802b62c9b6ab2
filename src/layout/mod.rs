pub(crate) mod position;
pub(crate) mod routing;
pub(crate) mod types;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{Filters, Graph, Seeds};
use crate::theme::Theme;
use crate::tree;

/// Runs the full pipeline over an in-memory graph snapshot: filter,
/// tree construction, coordinate assignment, connector routing.
///
/// Pure and synchronous; identical inputs give identical output, so
/// callers may memoize on an input-equality key. An unknown root or
/// seed id yields an empty layout, never an error.
pub fn compute_layout(
    graph: &Graph,
    seeds: &Seeds,
    filters: &Filters,
    theme: &Theme,
    config: &LayoutConfig,
) -> Layout {
    let forest = tree::build_forest(graph, seeds, filters, theme, config);
    let placement = position::place_forest(&forest, config);
    let edges = routing::route_forest(&forest, &placement, config);
    Layout {
        nodes: placement.nodes,
        edges,
        width: placement.width,
        height: placement.height,
    }
}
