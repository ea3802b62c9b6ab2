use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two media classes the explorer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Show,
    Publication,
}

/// A media entity as supplied by the external graph resolver.
///
/// `tags` is relevance-ordered: the first tag is the entity's most
/// prominent descriptor and drives primary-tag filtering and the
/// self-selection rule in the tree builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Affinity label used for default coloring when no tag-group
    /// ancestor applies.
    #[serde(default)]
    pub cluster: Option<String>,
    pub kind: MediaKind,
    /// Streaming/publishing services the entity is available on.
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Directed relationship: `from` recommends/relates-to `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEdge {
    pub from: String,
    pub to: String,
}

/// An already-resolved entity/edge snapshot. The engine only reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub edges: Vec<RelationEdge>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate entity id `{0}`")]
    DuplicateEntity(String),
    #[error("edge references unknown entity `{0}`")]
    UnknownEntity(String),
}

impl Graph {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Adjacency map over the directed relationship edges.
    pub fn outgoing(&self) -> HashMap<&str, Vec<&str>> {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
        }
        adjacency
    }

    /// Structural validation run before the snapshot is handed to the
    /// engine. The engine itself assumes a well-formed graph.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.id.as_str()) {
                return Err(SnapshotError::DuplicateEntity(entity.id.clone()));
            }
        }
        for edge in &self.edges {
            for endpoint in [edge.from.as_str(), edge.to.as_str()] {
                if !seen.contains(endpoint) {
                    return Err(SnapshotError::UnknownEntity(endpoint.to_string()));
                }
            }
        }
        Ok(())
    }

    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        let graph: Graph = serde_json::from_str(input)?;
        graph.validate()?;
        Ok(graph)
    }
}

/// Starting points for exploration: a single root, or several seeds from
/// a tag-based query. `root_id` wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seeds {
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub seed_ids: Vec<String>,
}

impl Seeds {
    pub fn single(root_id: impl Into<String>) -> Self {
        Self {
            root_id: Some(root_id.into()),
            seed_ids: Vec::new(),
        }
    }

    pub fn multi<I, S>(seed_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root_id: None,
            seed_ids: seed_ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// The entity's first (primary) tag must be among the required tags.
    Primary,
    /// Every required tag must appear somewhere in the entity's tag list.
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    Shows,
    Publications,
    #[default]
    Both,
}

/// Already-resolved filter predicates. Seeds and roots are exempt: an
/// explicitly chosen starting point is always kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub required_tags: BTreeSet<String>,
    #[serde(default)]
    pub excluded_tags: BTreeSet<String>,
    #[serde(default)]
    pub filter_mode: FilterMode,
    #[serde(default)]
    pub deselected_services: BTreeSet<String>,
    #[serde(default)]
    pub media_filter: MediaFilter,
}

impl Filters {
    pub fn accepts(&self, entity: &Entity) -> bool {
        match self.media_filter {
            MediaFilter::Shows if entity.kind != MediaKind::Show => return false,
            MediaFilter::Publications if entity.kind != MediaKind::Publication => return false,
            _ => {}
        }
        if entity.tags.iter().any(|tag| self.excluded_tags.contains(tag)) {
            return false;
        }
        if !self.required_tags.is_empty() {
            let matched = match self.filter_mode {
                FilterMode::Primary => entity
                    .tags
                    .first()
                    .is_some_and(|tag| self.required_tags.contains(tag)),
                FilterMode::All => self
                    .required_tags
                    .iter()
                    .all(|tag| entity.tags.iter().any(|have| have == tag)),
            };
            if !matched {
                return false;
            }
        }
        // An entity only available on deselected services is hidden; an
        // entity with no service data is never service-filtered.
        if !entity.services.is_empty()
            && entity
                .services
                .iter()
                .all(|service| self.deselected_services.contains(service))
        {
            return false;
        }
        true
    }
}
