use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{ArticleSummary, Author, Category},
    services::{
        catalog::{ArticleCatalog, CatalogQuery},
        retry::RetryPolicy,
    },
};

const PUBLISHED_ARTICLES_SQL: &str = r#"
    SELECT a.id, a.slug, a.title, a.excerpt, a.cover_image, a.published_at,
           c.name AS category, c.slug AS category_slug,
           au.id AS author_id, au.name AS author_name, au.avatar_url AS author_avatar_url
    FROM articles a
    JOIN categories c ON c.id = a.category_id
    LEFT JOIN authors au ON au.id = a.author_id
    WHERE a.published
      AND (cardinality($1::text[]) = 0 OR c.slug = ANY($1::text[]))
      AND NOT (a.id = ANY($2::text[]))
    ORDER BY a.published_at DESC, a.id
    LIMIT $3
"#;

const CATEGORIES_SQL: &str = "SELECT id, name, slug FROM categories ORDER BY name";

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: String,
    slug: String,
    title: String,
    excerpt: Option<String>,
    cover_image: Option<String>,
    published_at: DateTime<Utc>,
    category: String,
    category_slug: String,
    author_id: Option<String>,
    author_name: Option<String>,
    author_avatar_url: Option<String>,
}

impl From<ArticleRow> for ArticleSummary {
    fn from(row: ArticleRow) -> Self {
        // LEFT JOIN yields all-null author columns for unattributed articles
        let author = match (row.author_id, row.author_name) {
            (Some(id), Some(name)) => Some(Author {
                id,
                name,
                avatar_url: row.author_avatar_url,
            }),
            _ => None,
        };

        ArticleSummary {
            id: row.id,
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            cover_image: row.cover_image,
            date: row.published_at,
            category: row.category,
            category_slug: row.category_slug,
            author,
        }
    }
}

/// Catalog backed by the PostgreSQL articles schema
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgCatalog {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait::async_trait]
impl ArticleCatalog for PgCatalog {
    async fn published_articles(&self, query: &CatalogQuery) -> AppResult<Vec<ArticleSummary>> {
        let limit = i64::try_from(query.limit)
            .map_err(|_| AppError::InvalidInput(format!("limit {} too large", query.limit)))?;

        let rows: Vec<ArticleRow> = sqlx::query_as(PUBLISHED_ARTICLES_SQL)
            .bind(&query.category_slugs)
            .bind(&query.exclude_ids)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            categories = ?query.category_slugs,
            excluded = query.exclude_ids.len(),
            limit = query.limit,
            returned = rows.len(),
            "Catalog query completed"
        );

        Ok(rows.into_iter().map(ArticleSummary::from).collect())
    }

    async fn categories(&self) -> AppResult<Vec<Category>> {
        let rows: Vec<(String, String, String)> = self
            .retry
            .run("list_categories", || async {
                sqlx::query_as(CATEGORIES_SQL)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, slug)| Category { id, name, slug })
            .collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ArticleRow {
        ArticleRow {
            id: "a1".to_string(),
            slug: "grid-systems".to_string(),
            title: "Grid Systems".to_string(),
            excerpt: Some("Columns and gutters".to_string()),
            cover_image: None,
            published_at: "2024-01-03T09:00:00Z".parse().unwrap(),
            category: "Design".to_string(),
            category_slug: "design".to_string(),
            author_id: Some("u1".to_string()),
            author_name: Some("Robin".to_string()),
            author_avatar_url: None,
        }
    }

    #[test]
    fn test_row_with_author() {
        let article = ArticleSummary::from(row());
        assert_eq!(article.id, "a1");
        assert_eq!(article.category_slug, "design");
        assert_eq!(
            article.author,
            Some(Author {
                id: "u1".to_string(),
                name: "Robin".to_string(),
                avatar_url: None,
            })
        );
    }

    #[test]
    fn test_row_without_author() {
        let article = ArticleSummary::from(ArticleRow {
            author_id: None,
            author_name: None,
            ..row()
        });
        assert_eq!(article.author, None);
    }

    #[test]
    fn test_published_articles_sql_orders_newest_first() {
        assert!(PUBLISHED_ARTICLES_SQL.contains("ORDER BY a.published_at DESC"));
        assert!(PUBLISHED_ARTICLES_SQL.contains("WHERE a.published"));
    }
}
