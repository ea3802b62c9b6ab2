use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::ir::Entity;

/// BFS over the directed relationship edges with a visited-set cycle
/// guard. Returns ids in first-visit order, starting with `start`.
pub(crate) fn reachable_from(
    adjacency: &HashMap<&str, Vec<&str>>,
    start: &str,
) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order: Vec<String> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        if let Some(targets) = adjacency.get(id) {
            for &target in targets {
                if visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }
    order
}

/// For every non-seed entity, the seeds it is reachable from, in seed
/// order. Entities absent from the map are orphans.
pub(crate) fn seed_membership(
    adjacency: &HashMap<&str, Vec<&str>>,
    seeds: &[&Entity],
) -> BTreeMap<String, Vec<String>> {
    let seed_set: HashSet<&str> = seeds.iter().map(|seed| seed.id.as_str()).collect();
    let mut membership: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for seed in seeds {
        for id in reachable_from(adjacency, &seed.id) {
            if seed_set.contains(id.as_str()) {
                continue;
            }
            membership.entry(id).or_default().push(seed.id.clone());
        }
    }
    membership
}
