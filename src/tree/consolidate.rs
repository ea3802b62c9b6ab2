use super::{GroupNode, TreeContext, TreeNode, frequency};

/// Merges degenerate single-leaf tag groups, depth-first.
///
/// Within one parent's children: if at least two tag groups hold
/// exactly one leaf each, their leaves regroup by shared new tags
/// (first-tag-wins, each leaf consumed once); leaves still unmatched
/// land in a synthetic "other" bucket, except a lone survivor whose
/// original group is restored unchanged.
pub(crate) fn consolidate(children: &mut Vec<TreeNode>, ctx: &mut TreeContext) {
    for child in children.iter_mut() {
        consolidate(child.children_mut(), ctx);
    }

    let single_ids: Vec<String> = children
        .iter()
        .filter_map(|node| match node {
            TreeNode::Group(group)
                if group.children.len() == 1 && group.children[0].is_leaf() =>
            {
                Some(group.id.clone())
            }
            _ => None,
        })
        .collect();
    if single_ids.len() < 2 {
        return;
    }

    let mut singles: Vec<GroupNode> = Vec::new();
    let mut kept: Vec<TreeNode> = Vec::new();
    for node in std::mem::take(children) {
        match node {
            TreeNode::Group(group) if single_ids.contains(&group.id) => singles.push(group),
            other => kept.push(other),
        }
    }
    *children = kept;

    let counts = frequency::new_tag_frequencies(singles.iter().map(|g| leaf_tags(g)));
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .collect();
    // highest support first, equal counts stay lexicographic
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut consumed = vec![false; singles.len()];
    for (tag, _) in &ranked {
        let supporters: Vec<usize> = singles
            .iter()
            .enumerate()
            .filter(|(idx, group)| {
                !consumed[*idx] && leaf_tags(group).iter().any(|have| have == tag)
            })
            .map(|(idx, _)| idx)
            .collect();
        if supporters.len() < 2 {
            continue;
        }
        let mut leaves: Vec<TreeNode> = Vec::new();
        for idx in supporters {
            consumed[idx] = true;
            leaves.push(extract_leaf(&singles[idx], tag));
        }
        if let Some(existing) = find_group_mut(children, tag) {
            existing.children.append(&mut leaves);
        } else {
            children.push(TreeNode::Group(GroupNode {
                id: ctx.group_id(tag),
                label: tag.clone(),
                synthetic: false,
                color: String::new(),
                children: leaves,
            }));
        }
    }

    let leftovers: Vec<usize> = (0..singles.len()).filter(|idx| !consumed[*idx]).collect();
    if leftovers.len() >= 2 {
        let label = ctx.config.tree.other_label.clone();
        let leaves: Vec<TreeNode> = leftovers
            .iter()
            .filter_map(|&idx| singles[idx].children.first().cloned())
            .collect();
        children.push(TreeNode::Group(GroupNode {
            id: ctx.group_id(&label),
            label,
            synthetic: true,
            color: String::new(),
            children: leaves,
        }));
    } else if let Some(&idx) = leftovers.first() {
        children.push(TreeNode::Group(singles[idx].clone()));
    }
}

fn leaf_tags(group: &GroupNode) -> &[String] {
    match group.children.first() {
        Some(TreeNode::Entity(entity)) => &entity.new_tags,
        _ => &[],
    }
}

/// Clones the singleton's leaf, stripping the tag it now branches on.
fn extract_leaf(group: &GroupNode, tag: &str) -> TreeNode {
    match group.children.first() {
        Some(TreeNode::Entity(entity)) => {
            let mut leaf = entity.clone();
            leaf.new_tags.retain(|have| have != tag);
            TreeNode::Entity(leaf)
        }
        Some(other) => other.clone(),
        None => TreeNode::Group(group.clone()),
    }
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
    use crate::ir::{Entity, MediaKind};
    use crate::tree::EntityNode;

    fn leaf(id: &str, new_tags: &[&str]) -> TreeNode {
        TreeNode::Entity(EntityNode {
            id: id.to_string(),
            entity: Entity {
                id: id.to_string(),
                title: id.to_string(),
                tags: new_tags.iter().map(|t| t.to_string()).collect(),
                cluster: None,
                kind: MediaKind::Show,
                services: Vec::new(),
                metadata: Default::default(),
            },
            new_tags: new_tags.iter().map(|t| t.to_string()).collect(),
            color: String::new(),
            is_root: false,
            is_seed: false,
            children: Vec::new(),
        })
    }

    fn singleton(id: &str, label: &str, leaf_node: TreeNode) -> TreeNode {
        TreeNode::Group(GroupNode {
            id: id.to_string(),
            label: label.to_string(),
            synthetic: false,
            color: String::new(),
            children: vec![leaf_node],
        })
    }

    fn singleton_count(nodes: &[TreeNode]) -> usize {
        nodes
            .iter()
            .filter(|node| match node {
                TreeNode::Group(g) => {
                    !g.synthetic && g.children.len() == 1 && g.children[0].is_leaf()
                }
                _ => false,
            })
            .count()
    }

    #[test]
    fn shared_new_tags_regroup_singletons() {
        let config = LayoutConfig::default();
        let mut ctx = TreeContext::new(&config);
        let mut children = vec![
            singleton("g1", "alpha", leaf("a", &["mecha", "space"])),
            singleton("g2", "beta", leaf("b", &["mecha"])),
            singleton("g3", "gamma", leaf("c", &["space"])),
        ];
        consolidate(&mut children, &mut ctx);
        // "mecha" and "space" both have two supporters; mecha ranks
        // first lexicographically at equal count and consumes "a".
        let Some(TreeNode::Group(mecha)) = children
            .iter()
            .find(|n| matches!(n, TreeNode::Group(g) if g.label == "mecha"))
        else {
            panic!("missing mecha group");
        };
        assert_eq!(mecha.children.len(), 2);
        // "c" is the lone leftover: its original group is restored
        assert!(
            children
                .iter()
                .any(|n| matches!(n, TreeNode::Group(g) if g.label == "gamma"))
        );
    }

    #[test]
    fn unmatched_singletons_bucket_under_other() {
        let config = LayoutConfig::default();
        let mut ctx = TreeContext::new(&config);
        let mut children = vec![
            singleton("g1", "alpha", leaf("a", &["one"])),
            singleton("g2", "beta", leaf("b", &["two"])),
            singleton("g3", "gamma", leaf("c", &["three"])),
        ];
        consolidate(&mut children, &mut ctx);
        assert_eq!(children.len(), 1);
        let TreeNode::Group(other) = &children[0] else {
            panic!("expected group");
        };
        assert_eq!(other.label, "other");
        assert!(other.synthetic);
        assert_eq!(other.children.len(), 3);
        assert_eq!(singleton_count(&children), 0);
    }

    #[test]
    fn single_singleton_is_left_untouched() {
        let config = LayoutConfig::default();
        let mut ctx = TreeContext::new(&config);
        let mut children = vec![
            singleton("g1", "alpha", leaf("a", &["one"])),
            TreeNode::Group(GroupNode {
                id: "g2".to_string(),
                label: "big".to_string(),
                synthetic: false,
                color: String::new(),
                children: vec![leaf("b", &[]), leaf("c", &[])],
            }),
        ];
        let before = children.len();
        consolidate(&mut children, &mut ctx);
        assert_eq!(children.len(), before);
        assert_eq!(singleton_count(&children), 1);
    }

    #[test]
    fn merges_into_existing_sibling_group() {
        let config = LayoutConfig::default();
        let mut ctx = TreeContext::new(&config);
        let mut children = vec![
            TreeNode::Group(GroupNode {
                id: "g0".to_string(),
                label: "mecha".to_string(),
                synthetic: false,
                color: String::new(),
                children: vec![leaf("x", &[]), leaf("y", &[])],
            }),
            singleton("g1", "alpha", leaf("a", &["mecha"])),
            singleton("g2", "beta", leaf("b", &["mecha"])),
        ];
        consolidate(&mut children, &mut ctx);
        assert_eq!(children.len(), 1);
        let TreeNode::Group(mecha) = &children[0] else {
            panic!("expected group");
        };
        assert_eq!(mecha.children.len(), 4);
    }
}
