use super::TreeNode;

/// Removes redundant tag→tag chain levels: any group whose only child
/// is itself a group is replaced by that child, to fixed point.
/// Running it twice is the same as running it once.
pub fn flatten(nodes: &mut Vec<TreeNode>) {
    for node in nodes.iter_mut() {
        flatten_node(node);
    }
}

fn flatten_node(node: &mut TreeNode) {
    loop {
        let promote = match node {
            TreeNode::Group(group) => {
                group.children.len() == 1 && group.children[0].is_group()
            }
            TreeNode::Entity(_) => false,
        };
        if !promote {
            break;
        }
        if let TreeNode::Group(group) = node
            && let Some(child) = group.children.pop()
        {
            *node = child;
        }
    }
    for child in node.children_mut() {
        flatten_node(child);
    }
}
