use std::collections::{BTreeMap, BTreeSet};

use crate::ir::Entity;

use super::{GroupNode, TreeContext, TreeNode, frequency};

/// Recursively partitions `items` into tag-defined groups and leaves.
///
/// Each item self-selects the first tag in its own relevance order with
/// enough support among the candidates; a greedy global assignment
/// would change grouping outcomes and is deliberately avoided.
pub(crate) fn build_level(
    items: &[Entity],
    used: &BTreeSet<String>,
    depth: usize,
    ctx: &mut TreeContext,
) -> Vec<TreeNode> {
    if items.is_empty() {
        return Vec::new();
    }
    if depth >= ctx.config.tree.max_depth {
        return items.iter().map(|item| ctx.leaf(item, used)).collect();
    }
    let min_size = ctx.config.tree.min_group_size;
    let counts = frequency::tag_frequencies(items, used);
    if counts.is_empty() {
        // No differentiating tag left at all.
        return items.iter().map(|item| ctx.leaf(item, used)).collect();
    }

    let mut groups: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
    let mut unassigned: Vec<Entity> = Vec::new();
    for item in items {
        match first_qualifying_tag(item, used, &counts, min_size) {
            Some(tag) => groups.entry(tag).or_default().push(item.clone()),
            None => unassigned.push(item.clone()),
        }
    }

    // Dissolve size-1 groups into a re-pool and rerun self-selection
    // with frequencies restricted to the pool, giving previously-minor
    // tags a chance to form groups.
    let singleton_tags: Vec<String> = groups
        .iter()
        .filter(|(_, members)| members.len() == 1)
        .map(|(tag, _)| tag.clone())
        .collect();
    let mut pool: Vec<Entity> = Vec::new();
    for tag in &singleton_tags {
        if let Some(mut members) = groups.remove(tag) {
            pool.append(&mut members);
        }
    }
    if pool.len() >= min_size {
        let pool_counts = frequency::tag_frequencies(&pool, used);
        let mut pool_groups: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
        for item in pool {
            match first_qualifying_tag(&item, used, &pool_counts, min_size) {
                Some(tag) => pool_groups.entry(tag).or_default().push(item),
                None => unassigned.push(item),
            }
        }
        for (tag, members) in pool_groups {
            if members.len() >= min_size {
                groups.entry(tag).or_default().extend(members);
            } else {
                unassigned.extend(members);
            }
        }
    } else {
        unassigned.extend(pool);
    }

    // Largest groups first; equal sizes stay lexicographic because the
    // stable sort runs over the BTreeMap's label order.
    let mut ordered: Vec<(String, Vec<Entity>)> = groups.into_iter().collect();
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut nodes: Vec<TreeNode> = Vec::new();
    for (tag, members) in ordered {
        let mut deeper_used = used.clone();
        deeper_used.insert(tag.clone());
        let mut children = build_level(&members, &deeper_used, depth + 1, ctx);
        // A bare tag→tag chain with no entities in between collapses:
        // the subgroups' own children merge upward under this label.
        if !children.is_empty() && children.iter().all(TreeNode::is_group) {
            children = children
                .into_iter()
                .flat_map(TreeNode::into_children)
                .collect();
        }
        nodes.push(TreeNode::Group(GroupNode {
            id: ctx.group_id(&tag),
            label: tag,
            synthetic: false,
            color: String::new(),
            children,
        }));
    }

    resolve_unassigned(&unassigned, used, min_size, &mut nodes, ctx);
    nodes
}

/// Deferred items try, in order: joining an already-emitted group for
/// one of their remaining tags (preferring tags most shared among the
/// other deferred items), seeding a new group from their best shared
/// tag, and finally a bare leaf at the current level.
fn resolve_unassigned(
    unassigned: &[Entity],
    used: &BTreeSet<String>,
    min_size: usize,
    nodes: &mut Vec<TreeNode>,
    ctx: &mut TreeContext,
) {
    let shared = frequency::tag_frequencies(unassigned, used);
    let mut bare: Vec<TreeNode> = Vec::new();
    for item in unassigned {
        let mut candidates: Vec<&String> =
            item.tags.iter().filter(|tag| !used.contains(*tag)).collect();
        // Most-shared first; ties keep the item's own relevance order.
        candidates.sort_by(|a, b| {
            shared
                .get(*b)
                .unwrap_or(&0)
                .cmp(shared.get(*a).unwrap_or(&0))
        });

        let attach_label = candidates
            .iter()
            .find(|tag| find_group(nodes, tag).is_some())
            .map(|tag| (**tag).clone());
        if let Some(label) = attach_label {
            let mut leaf_used = used.clone();
            leaf_used.insert(label.clone());
            let leaf = ctx.leaf(item, &leaf_used);
            if let Some(group) = find_group_mut(nodes, &label) {
                group.children.push(leaf);
            }
            continue;
        }

        match candidates.first() {
            Some(best) if shared.get(*best).copied().unwrap_or(0) >= min_size => {
                let label = (**best).clone();
                let mut leaf_used = used.clone();
                leaf_used.insert(label.clone());
                let leaf = ctx.leaf(item, &leaf_used);
                nodes.push(TreeNode::Group(GroupNode {
                    id: ctx.group_id(&label),
                    label,
                    synthetic: false,
                    color: String::new(),
                    children: vec![leaf],
                }));
            }
            _ => bare.push(ctx.leaf(item, used)),
        }
    }
    nodes.append(&mut bare);
}

fn first_qualifying_tag(
    item: &Entity,
    used: &BTreeSet<String>,
    counts: &BTreeMap<String, usize>,
    min_size: usize,
) -> Option<String> {
    item.tags
        .iter()
        .find(|tag| !used.contains(*tag) && counts.get(*tag).copied().unwrap_or(0) >= min_size)
        .cloned()
}

fn find_group<'a>(nodes: &'a [TreeNode], label: &str) -> Option<&'a GroupNode> {
    nodes.iter().find_map(|node| match node {
        TreeNode::Group(group) if !group.synthetic && group.label == label => Some(group),
        _ => None,
    })
}

fn find_group_mut<'a>(nodes: &'a mut [TreeNode], label: &str) -> Option<&'a mut GroupNode> {
    nodes.iter_mut().find_map(|node| match node {
        TreeNode::Group(group) if !group.synthetic && group.label == label => Some(group),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::MediaKind;

    fn entity(id: &str, tags: &[&str]) -> Entity {
        Entity {
            id: id.to_string(),
            title: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            cluster: None,
            kind: MediaKind::Show,
            services: Vec::new(),
            metadata: Default::default(),
        }
    }

    fn build(items: &[Entity], config: &LayoutConfig) -> Vec<TreeNode> {
        let mut ctx = TreeContext::new(config);
        build_level(items, &BTreeSet::new(), 0, &mut ctx)
    }

    fn group_labels(nodes: &[TreeNode]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|node| match node {
                TreeNode::Group(group) => Some(group.label.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn nested_branches_form_by_shared_tags() {
        // Five entities share "isekai"; three of those also share
        // "mecha", which becomes a second-level branch.
        let items = vec![
            entity("a", &["isekai", "mecha"]),
            entity("b", &["isekai", "mecha"]),
            entity("c", &["isekai", "mecha"]),
            entity("d", &["isekai", "slice"]),
            entity("e", &["isekai", "sports"]),
        ];
        let config = LayoutConfig::default();
        let nodes = build(&items, &config);
        assert_eq!(group_labels(&nodes), vec!["isekai"]);
        let TreeNode::Group(isekai) = &nodes[0] else {
            panic!("expected group");
        };
        assert_eq!(group_labels(&isekai.children), vec!["mecha"]);
        let TreeNode::Group(mecha) = &isekai.children[0] else {
            panic!("expected group");
        };
        assert_eq!(mecha.children.len(), 3);
        // the two non-mecha entities stay as direct leaves
        assert_eq!(isekai.children.iter().filter(|n| n.is_leaf()).count(), 2);
    }

    #[test]
    fn items_self_select_their_own_first_tag() {
        // "b" is globally more popular, but X's first tag is "a"; a
        // greedy global assignment would steal X into the "b" group.
        let items = vec![
            entity("x", &["a", "b"]),
            entity("y", &["b"]),
            entity("z", &["a"]),
            entity("w", &["b"]),
        ];
        let config = LayoutConfig::default();
        let nodes = build(&items, &config);
        let labels = group_labels(&nodes);
        assert!(labels.contains(&"a".to_string()));
        let Some(TreeNode::Group(a_group)) = nodes
            .iter()
            .find(|n| matches!(n, TreeNode::Group(g) if g.label == "a"))
        else {
            panic!("missing group a");
        };
        let ids: Vec<&str> = a_group
            .children
            .iter()
            .map(|child| child.id())
            .collect();
        assert!(ids.contains(&"x"));
        assert!(ids.contains(&"z"));
    }

    #[test]
    fn no_shared_tags_flattens_to_leaves() {
        let items = vec![
            entity("a", &["one"]),
            entity("b", &["two"]),
            entity("c", &["three"]),
        ];
        let config = LayoutConfig::default();
        let nodes = build(&items, &config);
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(TreeNode::is_leaf));
    }

    #[test]
    fn depth_limit_stops_recursion() {
        let items = vec![
            entity("a", &["x", "y"]),
            entity("b", &["x", "y"]),
            entity("c", &["x", "y"]),
        ];
        let mut config = LayoutConfig::default();
        config.tree.max_depth = 1;
        let nodes = build(&items, &config);
        let TreeNode::Group(x_group) = &nodes[0] else {
            panic!("expected group");
        };
        // no "y" subgroup: depth 1 already reached
        assert!(x_group.children.iter().all(TreeNode::is_leaf));
    }

    #[test]
    fn repool_recovers_minor_tag_groups() {
        // "a" and "b" self-select tags that end up as size-1 groups;
        // the re-pool pass regroups both under their shared "pop".
        let items = vec![
            entity("a", &["t", "pop"]),
            entity("b", &["u", "pop"]),
            entity("c", &["x", "t"]),
            entity("d", &["x"]),
            entity("e", &["y", "u"]),
            entity("f", &["y"]),
        ];
        let config = LayoutConfig::default();
        let nodes = build(&items, &config);
        let labels = group_labels(&nodes);
        assert!(labels.contains(&"pop".to_string()), "labels: {labels:?}");
        for node in &nodes {
            if let TreeNode::Group(group) = node {
                assert!(group.children.len() >= 2, "singleton group {}", group.label);
            }
        }
    }

    #[test]
    fn unassigned_items_attach_to_matching_groups() {
        // "z" self-selects "t", which dissolves as a singleton; it then
        // attaches to the emitted "mecha" group via its remaining tag.
        let items = vec![
            entity("a", &["mecha"]),
            entity("b", &["mecha"]),
            entity("v", &["s"]),
            entity("w", &["s", "t"]),
            entity("z", &["t", "mecha"]),
        ];
        let config = LayoutConfig::default();
        let nodes = build(&items, &config);
        let Some(TreeNode::Group(mecha)) = nodes
            .iter()
            .find(|n| matches!(n, TreeNode::Group(g) if g.label == "mecha"))
        else {
            panic!("missing mecha group");
        };
        let ids: Vec<&str> = mecha.children.iter().map(|child| child.id()).collect();
        assert_eq!(ids, vec!["a", "b", "z"]);
    }

    #[test]
    fn truly_orphaned_item_becomes_bare_leaf() {
        let items = vec![
            entity("a", &["mecha"]),
            entity("b", &["mecha"]),
            entity("c", &["unique"]),
        ];
        let config = LayoutConfig::default();
        let nodes = build(&items, &config);
        assert_eq!(nodes.len(), 2);
        assert!(nodes[1].is_leaf());
        assert_eq!(nodes[1].id(), "c");
    }
}
