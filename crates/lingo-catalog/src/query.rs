//! Search and listing over loaded catalogs.

use crate::error::{CatalogError, CatalogResult};
use crate::model::{LanguageCatalog, SearchHit, TranslationEntry};
use crate::repository::CatalogRepository;

/// Case-insensitive substring search over identifiers and targets.
///
/// With `language` set only that catalog is loaded; an unknown language yields
/// no hits. An empty query matches every entry.
///
/// # Errors
///
/// Propagates read and decode failures of the catalogs searched, and
/// [`CatalogError::InvalidInput`] for a malformed language filter.
pub async fn search(
    repository: &CatalogRepository,
    query: &str,
    language: Option<&str>,
) -> CatalogResult<Vec<SearchHit>> {
    let languages = match language {
        Some(code) => match repository.load_language(code).await {
            Ok(catalog) => vec![catalog],
            Err(CatalogError::NotFound { .. }) => Vec::new(),
            Err(err) => return Err(err),
        },
        None => repository.list_languages().await?,
    };
    Ok(matches(&languages, query))
}

/// Every entry of one language.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] when the language has no catalog.
pub async fn list(
    repository: &CatalogRepository,
    language: &str,
) -> CatalogResult<Vec<TranslationEntry>> {
    Ok(repository.load_language(language).await?.entries)
}

/// Hits in language order, then entry order.
#[must_use]
pub fn matches(languages: &[LanguageCatalog], query: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    languages
        .iter()
        .flat_map(|catalog| {
            catalog
                .entries
                .iter()
                .filter(|entry| {
                    entry.identifier.to_lowercase().contains(&needle)
                        || entry.target.to_lowercase().contains(&needle)
                })
                .map(|entry| SearchHit {
                    language: catalog.code.clone(),
                    identifier: entry.identifier.clone(),
                    target: entry.target.clone(),
                    context: entry.context.clone(),
                })
        })
        .collect()
}
