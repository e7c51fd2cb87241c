//! Article catalog abstraction
//!
//! The recommendation scorer never talks to the database directly; it asks an
//! `ArticleCatalog` for published articles. Production uses PostgreSQL, tests
//! substitute a mock or an in-memory catalog.

use crate::{
    error::AppResult,
    models::{ArticleSummary, Category},
};

pub mod postgres;

pub use postgres::PgCatalog;

/// Filter for a published-article lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Restrict to these categories. Empty means any category.
    pub category_slugs: Vec<String>,
    /// Never return these article ids
    pub exclude_ids: Vec<String>,
    pub limit: usize,
}

/// Read access to published articles
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArticleCatalog: Send + Sync {
    /// Published articles matching `query`, newest first
    async fn published_articles(&self, query: &CatalogQuery) -> AppResult<Vec<ArticleSummary>>;

    /// All categories, ordered by name
    async fn categories(&self) -> AppResult<Vec<Category>>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
