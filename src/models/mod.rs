use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod history;
pub mod recommendation;

pub use history::{HistoryEntry, HistoryEntryInput, MAX_HISTORY_ITEMS};
pub use recommendation::{
    CategoryAffinity, HistoryRef, RecommendationCandidate, RecommendationRequest,
};

/// Published article as shown in lists and recommendation panels
///
/// One shape for every call site: fields some listings do not carry
/// (excerpt, cover image, author) are optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Publish date
    pub date: DateTime<Utc>,
    pub category: String,
    pub category_slug: String,
    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}
