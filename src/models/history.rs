use serde::{Deserialize, Serialize};

/// Upper bound on entries kept in a reading history
pub const MAX_HISTORY_ITEMS: usize = 20;

/// One viewed article in a reading history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub cover_image: String,
    pub category: String,
    pub category_slug: String,
    /// Milliseconds since the Unix epoch of the latest visit
    pub timestamp: i64,
}

/// Fields supplied by the caller when recording a visit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_slug: String,
}

impl HistoryEntryInput {
    /// Stamps the input with a visit time
    pub fn into_entry(self, timestamp: i64) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            slug: self.slug,
            title: self.title,
            cover_image: self.cover_image,
            category: self.category,
            category_slug: self.category_slug,
            timestamp,
        }
    }
}
