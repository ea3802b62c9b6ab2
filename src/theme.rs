use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Default branch palette, hashed into by tag label so the same tag
/// always renders the same color across runs.
static BRANCH_PALETTE: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "#6366F1", "#0EA5E9", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6",
        "#14B8A6", "#F97316", "#84CC16", "#EC4899", "#06B6D4", "#A855F7",
    ]
    .iter()
    .map(|color| color.to_string())
    .collect()
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub branch_palette: Vec<String>,
    /// Fallback for seed/root cards and leaves with no group ancestor
    /// and no cluster label.
    pub seed_color: String,
    /// Color for the synthetic "other" / "Other Recommendations" buckets.
    pub other_color: String,
    pub background: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            branch_palette: BRANCH_PALETTE.clone(),
            seed_color: "#1C2430".to_string(),
            other_color: "#64748B".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    /// Deterministic palette pick for a tag or cluster label.
    pub fn color_for_label(&self, label: &str) -> String {
        if self.branch_palette.is_empty() {
            return self.seed_color.clone();
        }
        let index = label_hash(label) as usize % self.branch_palette.len();
        self.branch_palette[index].clone()
    }
}

/// djb2 string hash. Non-cryptographic, stable across runs and platforms.
pub fn label_hash(label: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in label.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash
}
