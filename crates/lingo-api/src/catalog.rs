//! Catalog engine abstraction for the API layer.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lingo_catalog::{
    CatalogResult, CatalogService, LanguageSummary, SearchHit, TranslationEntry,
    TranslationUpdate, UpdateReport,
};

/// Catalog operations the HTTP handlers depend on.
#[async_trait]
pub trait CatalogFacade: Send + Sync {
    /// Directory the catalogs are read from.
    fn locales_dir(&self) -> &Path;
    /// Statistics for every language.
    async fn languages(&self) -> CatalogResult<Vec<LanguageSummary>>;
    /// Entries of one language.
    async fn translations(&self, code: &str) -> CatalogResult<Vec<TranslationEntry>>;
    /// Apply a batch of updates to one language.
    async fn update_translations(
        &self,
        code: &str,
        updates: Vec<TranslationUpdate>,
    ) -> CatalogResult<UpdateReport>;
    /// Replace the target of one entry.
    async fn update_translation(
        &self,
        code: &str,
        identifier: &str,
        target: &str,
        context: Option<String>,
    ) -> CatalogResult<UpdateReport>;
    /// Search across languages, or within one.
    async fn search(&self, text: &str, language: Option<&str>) -> CatalogResult<Vec<SearchHit>>;
}

/// Shared reference to the catalog backend.
pub type SharedCatalog = Arc<dyn CatalogFacade>;

#[async_trait]
impl CatalogFacade for CatalogService {
    fn locales_dir(&self) -> &Path {
        Self::locales_dir(self)
    }

    async fn languages(&self) -> CatalogResult<Vec<LanguageSummary>> {
        Self::languages(self).await
    }

    async fn translations(&self, code: &str) -> CatalogResult<Vec<TranslationEntry>> {
        Self::translations(self, code).await
    }

    async fn update_translations(
        &self,
        code: &str,
        updates: Vec<TranslationUpdate>,
    ) -> CatalogResult<UpdateReport> {
        Self::update_translations(self, code, updates).await
    }

    async fn update_translation(
        &self,
        code: &str,
        identifier: &str,
        target: &str,
        context: Option<String>,
    ) -> CatalogResult<UpdateReport> {
        Self::update_translation(self, code, identifier, target, context).await
    }

    async fn search(&self, text: &str, language: Option<&str>) -> CatalogResult<Vec<SearchHit>> {
        Self::search(self, text, language).await
    }
}
