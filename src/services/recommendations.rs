use std::collections::{HashMap, HashSet};

use crate::{
    models::{ArticleSummary, CategoryAffinity, HistoryRef, RecommendationCandidate},
    services::catalog::{ArticleCatalog, CatalogQuery},
};

/// Number of strongest categories that drive candidate selection
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Recommendations returned when the caller does not ask for a count
pub const DEFAULT_LIMIT: usize = 4;

/// Candidates fetched per requested recommendation, leaving room for post-filtering
const OVERFETCH_FACTOR: usize = 2;

/// Generates personalized reading recommendations
///
/// Ranks unread published articles by how strongly their category features in
/// the reader's history. With no history the newest articles are returned
/// unscored. Catalog failures are logged and produce an empty list: a missing
/// recommendations panel is preferable to an error page.
pub async fn get_recommendations(
    catalog: &dyn ArticleCatalog,
    history: &[HistoryRef],
    exclude_ids: &[String],
    limit: usize,
) -> Vec<RecommendationCandidate> {
    if limit == 0 {
        return Vec::new();
    }

    let excluded = exclusion_set(history, exclude_ids);

    if history.is_empty() {
        return latest_articles(catalog, excluded, limit).await;
    }

    let affinity = category_affinity(history);
    let top = top_categories(&affinity, TOP_CATEGORY_COUNT);

    tracing::debug!(
        history = history.len(),
        excluded = excluded.len(),
        top_categories = ?top,
        "Scoring recommendations"
    );

    let query = CatalogQuery {
        category_slugs: top.clone(),
        exclude_ids: sorted_ids(&excluded),
        limit: limit.saturating_mul(OVERFETCH_FACTOR),
    };

    let candidates = match catalog.published_articles(&query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!(
                catalog = catalog.name(),
                error = %e,
                "Catalog query failed, returning no recommendations"
            );
            return Vec::new();
        }
    };

    let ranked = rank_candidates(candidates, &top, &excluded, limit);

    tracing::info!(
        returned = ranked.len(),
        limit,
        "Recommendations generated"
    );

    ranked
}

/// Newest published articles, used when there is no history to personalize from
async fn latest_articles(
    catalog: &dyn ArticleCatalog,
    excluded: HashSet<String>,
    limit: usize,
) -> Vec<RecommendationCandidate> {
    let query = CatalogQuery {
        category_slugs: Vec::new(),
        exclude_ids: sorted_ids(&excluded),
        limit,
    };

    let mut articles = match catalog.published_articles(&query).await {
        Ok(articles) => articles,
        Err(e) => {
            tracing::error!(
                catalog = catalog.name(),
                error = %e,
                "Catalog query for latest articles failed, returning no recommendations"
            );
            return Vec::new();
        }
    };

    articles.retain(|a| !excluded.contains(&a.id));
    articles.sort_by(|a, b| b.date.cmp(&a.date));
    articles.truncate(limit);

    articles
        .into_iter()
        .map(|article| RecommendationCandidate {
            article,
            relevance_score: 0,
        })
        .collect()
}

/// Counts how often each category appears in the history
///
/// Ordered by frequency, strongest first; equal counts keep the order in which
/// the categories were first seen. Entries without a category are ignored.
pub fn category_affinity(history: &[HistoryRef]) -> Vec<CategoryAffinity> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut affinity: Vec<CategoryAffinity> = Vec::new();

    for entry in history {
        let slug = entry.category_slug.as_str();
        if slug.is_empty() {
            continue;
        }
        let next = affinity.len();
        let index = *position.entry(slug).or_insert(next);
        if index == next {
            affinity.push(CategoryAffinity {
                category_slug: slug.to_string(),
                frequency: 0,
            });
        }
        affinity[index].frequency += 1;
    }

    // Stable: ties stay in first-seen order
    affinity.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    affinity
}

/// Slugs of the `n` strongest categories, strongest first
pub fn top_categories(affinity: &[CategoryAffinity], n: usize) -> Vec<String> {
    affinity
        .iter()
        .take(n)
        .map(|a| a.category_slug.clone())
        .collect()
}

/// Ids that must never be recommended: already read plus explicitly excluded
pub fn exclusion_set(history: &[HistoryRef], exclude_ids: &[String]) -> HashSet<String> {
    history
        .iter()
        .map(|entry| entry.id.as_str())
        .chain(exclude_ids.iter().map(String::as_str))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score of a category given affinity order: strongest gets `len`, unmatched gets 0
pub fn relevance_score(category_slug: &str, top: &[String]) -> u32 {
    top.iter()
        .position(|slug| slug == category_slug)
        .map(|index| (top.len() - index) as u32)
        .unwrap_or(0)
}

/// Drops excluded candidates, scores the rest and keeps the best `limit`
///
/// Sorting is stable, so candidates with equal scores keep the catalog's
/// newest-first order.
pub fn rank_candidates(
    candidates: Vec<ArticleSummary>,
    top: &[String],
    excluded: &HashSet<String>,
    limit: usize,
) -> Vec<RecommendationCandidate> {
    let mut scored: Vec<RecommendationCandidate> = candidates
        .into_iter()
        .filter(|article| !excluded.contains(&article.id))
        .map(|article| RecommendationCandidate {
            relevance_score: relevance_score(&article.category_slug, top),
            article,
        })
        .collect();

    scored.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    scored.truncate(limit);
    scored
}

fn sorted_ids(ids: &HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().cloned().collect();
    ids.sort();
    ids
}
