use std::collections::{BTreeMap, BTreeSet};

use crate::ir::Entity;

/// Counts, per tag not yet used as a branch label, how many of the
/// candidate items expose it. A tag counts once per item even when an
/// item lists it twice. BTreeMap keeps iteration (and therefore every
/// downstream tie-break) lexicographic on the tag label.
pub(crate) fn tag_frequencies(
    items: &[Entity],
    used: &BTreeSet<String>,
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for tag in &item.tags {
            if used.contains(tag) || !seen.insert(tag.as_str()) {
                continue;
            }
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Same counting over leaf new-tag lists, used by the consolidator.
pub(crate) fn new_tag_frequencies<'a, I>(tag_lists: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for tags in tag_lists {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for tag in tags {
            if !seen.insert(tag.as_str()) {
                continue;
            }
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}
