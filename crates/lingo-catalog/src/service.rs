//! Facade tying the repository, mutator and query engine to one locales directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lingo_events::EventBus;
use lingo_telemetry::Metrics;

use crate::error::CatalogResult;
use crate::languages::LanguageNames;
use crate::locks::{ExclusiveAccess, PathLocks};
use crate::model::{LanguageSummary, SearchHit, TranslationEntry, TranslationUpdate, UpdateReport};
use crate::mutator::TranslationMutator;
use crate::query;
use crate::repository::CatalogRepository;
use crate::watcher::CatalogWatcher;

/// Catalog operations addressed by language code.
#[derive(Clone)]
pub struct CatalogService {
    repository: CatalogRepository,
    mutator: TranslationMutator,
    events: EventBus,
    metrics: Metrics,
}

impl CatalogService {
    /// Service over `root` with in-process path locks.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        names: LanguageNames,
        events: EventBus,
        metrics: Metrics,
    ) -> Self {
        Self::with_locks(root, names, Arc::new(PathLocks::new()), events, metrics)
    }

    /// Service over `root` serializing writes through `locks`.
    #[must_use]
    pub fn with_locks(
        root: impl Into<PathBuf>,
        names: LanguageNames,
        locks: Arc<dyn ExclusiveAccess>,
        events: EventBus,
        metrics: Metrics,
    ) -> Self {
        Self {
            repository: CatalogRepository::new(root, names),
            mutator: TranslationMutator::new(locks, events.clone(), metrics.clone()),
            events,
            metrics,
        }
    }

    /// Locales directory.
    #[must_use]
    pub fn locales_dir(&self) -> &Path {
        self.repository.root()
    }

    /// Underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &CatalogRepository {
        &self.repository
    }

    /// Statistics for every language.
    ///
    /// # Errors
    ///
    /// Propagates the first read or decode failure.
    pub async fn languages(&self) -> CatalogResult<Vec<LanguageSummary>> {
        let stats = self.repository.get_stats().await?;
        self.metrics.set_languages_loaded(stats.len());
        Ok(stats)
    }

    /// Entries of one language.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CatalogError::NotFound`] when the language has no catalog.
    pub async fn translations(&self, code: &str) -> CatalogResult<Vec<TranslationEntry>> {
        query::list(&self.repository, code).await
    }

    /// Apply a batch of updates to one language.
    ///
    /// # Errors
    ///
    /// See [`TranslationMutator::apply_updates`].
    pub async fn update_translations(
        &self,
        code: &str,
        updates: Vec<TranslationUpdate>,
    ) -> CatalogResult<UpdateReport> {
        let path = self.repository.catalog_path(code)?;
        self.mutator.apply_updates(&path, updates).await
    }

    /// Replace the target of one entry.
    ///
    /// # Errors
    ///
    /// See [`TranslationMutator::apply_single_update`].
    pub async fn update_translation(
        &self,
        code: &str,
        identifier: &str,
        target: &str,
        context: Option<String>,
    ) -> CatalogResult<UpdateReport> {
        let path = self.repository.catalog_path(code)?;
        self.mutator
            .apply_single_update(&path, identifier, target, context)
            .await
    }

    /// Search across languages, or within one.
    ///
    /// # Errors
    ///
    /// Propagates read and decode failures of the catalogs searched.
    pub async fn search(&self, text: &str, language: Option<&str>) -> CatalogResult<Vec<SearchHit>> {
        query::search(&self.repository, text, language).await
    }

    /// Watcher over the same directory, publishing on the same bus.
    #[must_use]
    pub fn watcher(&self, interval: Duration) -> CatalogWatcher {
        CatalogWatcher::new(
            self.repository.clone(),
            self.events.clone(),
            self.metrics.clone(),
            interval,
        )
    }
}
