use serde::{Deserialize, Serialize};

use super::{ArticleSummary, HistoryEntry};

/// Body of `POST /api/v1/recommendations`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub reading_history: Vec<HistoryRef>,
    #[serde(default)]
    pub exclude_ids: Vec<String>,
    /// Falls back to the configured default when omitted
    #[serde(default)]
    pub limit: Option<usize>,
}

/// The part of a history entry the scorer looks at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRef {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_slug: String,
}

impl From<&HistoryEntry> for HistoryRef {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            slug: entry.slug.clone(),
            category: entry.category.clone(),
            category_slug: entry.category_slug.clone(),
        }
    }
}

/// How often a category shows up in a reading history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAffinity {
    pub category_slug: String,
    pub frequency: usize,
}

/// An article returned as a recommendation, with its score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCandidate {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub relevance_score: u32,
}
