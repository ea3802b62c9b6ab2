mod builder;
mod consolidate;
mod flatten;
pub(crate) mod frequency;
mod membership;

pub use flatten::flatten;

use std::collections::{BTreeSet, HashMap};

use crate::config::LayoutConfig;
use crate::ir::{Entity, Filters, Graph, Seeds};
use crate::theme::Theme;

/// A node of the constructed relationship tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Group(GroupNode),
    Entity(EntityNode),
}

/// A tag-defined branch (or a synthetic bucket such as "other").
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub id: String,
    pub label: String,
    /// Synthetic buckets take the theme's neutral color instead of a
    /// palette hash of their label.
    pub synthetic: bool,
    pub color: String,
    pub children: Vec<TreeNode>,
}

/// An entity card. `children` is non-empty only for root/seed nodes.
#[derive(Debug, Clone)]
pub struct EntityNode {
    /// Possibly namespaced (`seed::entity`) for cross-seed clones.
    pub id: String,
    pub entity: Entity,
    /// Tags not already consumed as ancestor branch labels, capped at
    /// the configured chip count.
    pub new_tags: Vec<String>,
    pub color: String,
    pub is_root: bool,
    pub is_seed: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Group(group) => &group.id,
            TreeNode::Entity(entity) => &entity.id,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Group(group) => &group.children,
            TreeNode::Entity(entity) => &entity.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<TreeNode> {
        match self {
            TreeNode::Group(group) => &mut group.children,
            TreeNode::Entity(entity) => &mut entity.children,
        }
    }

    pub fn into_children(self) -> Vec<TreeNode> {
        match self {
            TreeNode::Group(group) => group.children,
            TreeNode::Entity(entity) => entity.children,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TreeNode::Group(_))
    }

    /// A childless entity card.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Entity(entity) if entity.children.is_empty())
    }
}

/// Shared working state for one tree construction pass. Group ids carry
/// a per-invocation counter so repeated tag labels across branches (and
/// across seed trees) stay unique.
pub(crate) struct TreeContext<'a> {
    pub config: &'a LayoutConfig,
    /// Entity id -> namespaced node id, for cross-seed clones. Empty
    /// means identity.
    pub leaf_ids: HashMap<String, String>,
    next_group: usize,
}

impl<'a> TreeContext<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            leaf_ids: HashMap::new(),
            next_group: 0,
        }
    }

    pub fn group_id(&mut self, label: &str) -> String {
        let id = format!("grp{}-{}", self.next_group, slug(label));
        self.next_group += 1;
        id
    }

    pub fn leaf_id(&self, entity: &Entity) -> String {
        self.leaf_ids
            .get(&entity.id)
            .cloned()
            .unwrap_or_else(|| entity.id.clone())
    }

    pub fn leaf(&self, entity: &Entity, used: &BTreeSet<String>) -> TreeNode {
        TreeNode::Entity(EntityNode {
            id: self.leaf_id(entity),
            new_tags: new_tags(entity, used, self.config.card.max_new_tags),
            entity: entity.clone(),
            color: String::new(),
            is_root: false,
            is_seed: false,
            children: Vec::new(),
        })
    }
}

pub(crate) fn new_tags(entity: &Entity, used: &BTreeSet<String>, cap: usize) -> Vec<String> {
    entity
        .tags
        .iter()
        .filter(|tag| !used.contains(*tag))
        .take(cap)
        .cloned()
        .collect()
}

fn slug(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Build the full forest for the given seeds: one tree per seed (or a
/// single rooted tree), plus the orphan branch in multi-seed mode.
/// Missing root/seed ids resolve to an empty forest, never an error.
pub fn build_forest(
    graph: &Graph,
    seeds: &Seeds,
    filters: &Filters,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<TreeNode> {
    let mut forest = if let Some(root_id) = seeds.root_id.as_deref() {
        single_root_forest(graph, root_id, filters, config)
    } else if !seeds.seed_ids.is_empty() {
        multi_seed_forest(graph, &seeds.seed_ids, filters, config)
    } else {
        Vec::new()
    };
    assign_colors(&mut forest, None, theme);
    forest
}

fn single_root_forest(
    graph: &Graph,
    root_id: &str,
    filters: &Filters,
    config: &LayoutConfig,
) -> Vec<TreeNode> {
    let Some(root) = graph.entity(root_id) else {
        return Vec::new();
    };
    let adjacency = graph.outgoing();
    let items: Vec<Entity> = membership::reachable_from(&adjacency, root_id)
        .iter()
        .filter(|id| id.as_str() != root_id)
        .filter_map(|id| graph.entity(id))
        .filter(|entity| filters.accepts(entity))
        .cloned()
        .collect();

    let mut ctx = TreeContext::new(config);
    let children = build_branch(&items, &mut ctx);
    vec![TreeNode::Entity(EntityNode {
        id: root.id.clone(),
        new_tags: new_tags(root, &BTreeSet::new(), config.card.max_new_tags),
        entity: root.clone(),
        color: String::new(),
        is_root: true,
        is_seed: false,
        children,
    })]
}

fn multi_seed_forest(
    graph: &Graph,
    seed_ids: &[String],
    filters: &Filters,
    config: &LayoutConfig,
) -> Vec<TreeNode> {
    let seeds: Vec<&Entity> = seed_ids
        .iter()
        .filter_map(|id| graph.entity(id))
        .collect();
    if seeds.is_empty() {
        return Vec::new();
    }
    let seed_set: BTreeSet<&str> = seeds.iter().map(|seed| seed.id.as_str()).collect();
    let adjacency = graph.outgoing();
    let membership = membership::seed_membership(&adjacency, &seeds);

    let mut ctx = TreeContext::new(config);
    let mut forest = Vec::new();
    for seed in &seeds {
        let items: Vec<Entity> = membership::reachable_from(&adjacency, &seed.id)
            .iter()
            .filter(|id| !seed_set.contains(id.as_str()))
            .filter_map(|id| graph.entity(id))
            .filter(|entity| filters.accepts(entity))
            .cloned()
            .collect();
        // Entities owned by several seeds are cloned under each owner
        // with a namespaced identity, keeping the output a proper tree.
        ctx.leaf_ids = items
            .iter()
            .filter(|entity| membership.get(&entity.id).is_some_and(|owners| owners.len() > 1))
            .map(|entity| (entity.id.clone(), format!("{}::{}", seed.id, entity.id)))
            .collect();
        let children = build_branch(&items, &mut ctx);
        forest.push(TreeNode::Entity(EntityNode {
            id: seed.id.clone(),
            new_tags: new_tags(seed, &BTreeSet::new(), config.card.max_new_tags),
            entity: (*seed).clone(),
            color: String::new(),
            is_root: false,
            is_seed: true,
            children,
        }));
    }

    ctx.leaf_ids = HashMap::new();
    let orphans: Vec<Entity> = graph
        .entities
        .iter()
        .filter(|entity| !seed_set.contains(entity.id.as_str()))
        .filter(|entity| !membership.contains_key(&entity.id))
        .filter(|entity| filters.accepts(entity))
        .cloned()
        .collect();
    if !orphans.is_empty() {
        let children = build_branch(&orphans, &mut ctx);
        let label = config.tree.orphan_label.clone();
        forest.push(TreeNode::Group(GroupNode {
            id: ctx.group_id(&label),
            label,
            synthetic: true,
            color: String::new(),
            children,
        }));
    }
    forest
}

/// Builder, consolidator and flattener applied in sequence to one
/// branch's item set.
fn build_branch(items: &[Entity], ctx: &mut TreeContext) -> Vec<TreeNode> {
    let mut nodes = builder::build_level(items, &BTreeSet::new(), 0, ctx);
    consolidate::consolidate(&mut nodes, ctx);
    flatten::flatten(&mut nodes);
    nodes
}

/// Post-pass: groups hash their label into the palette, leaves inherit
/// the nearest group ancestor, falling back to the entity's cluster
/// affinity and finally the seed color.
fn assign_colors(nodes: &mut [TreeNode], inherited: Option<&str>, theme: &Theme) {
    for node in nodes {
        match node {
            TreeNode::Group(group) => {
                group.color = if group.synthetic {
                    theme.other_color.clone()
                } else {
                    theme.color_for_label(&group.label)
                };
                let color = group.color.clone();
                assign_colors(&mut group.children, Some(&color), theme);
            }
            TreeNode::Entity(entity) => {
                entity.color = if entity.is_root || entity.is_seed {
                    theme.seed_color.clone()
                } else if let Some(color) = inherited {
                    color.to_string()
                } else if let Some(cluster) = entity.entity.cluster.as_deref() {
                    theme.color_for_label(cluster)
                } else {
                    theme.seed_color.clone()
                };
                // Children of a root/seed card start their own branches.
                assign_colors(&mut entity.children, None, theme);
            }
        }
    }
}
