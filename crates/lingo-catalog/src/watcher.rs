//! Polling watcher announcing on-disk catalog changes.
//!
//! # Design
//! - Each scan fingerprints every catalog by modification time and length and
//!   diffs against the previous scan.
//! - The first scan only records a baseline.
//! - Writes made through the API are seen like any other edit; clients treat
//!   both event kinds as "reload".

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use lingo_events::{Event, EventBus};
use lingo_telemetry::Metrics;
use tokio::fs;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::CatalogResult;
use crate::repository::CatalogRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

/// Polls the locales directory and publishes catalog change events.
pub struct CatalogWatcher {
    repository: CatalogRepository,
    events: EventBus,
    metrics: Metrics,
    interval: Duration,
    known: BTreeMap<PathBuf, (String, Fingerprint)>,
}

impl CatalogWatcher {
    /// Watcher scanning `repository` every `interval`.
    #[must_use]
    pub fn new(
        repository: CatalogRepository,
        events: EventBus,
        metrics: Metrics,
        interval: Duration,
    ) -> Self {
        Self {
            repository,
            events,
            metrics,
            interval,
            known: BTreeMap::new(),
        }
    }

    /// Record the current state without publishing anything.
    ///
    /// # Errors
    ///
    /// Returns the directory listing failure.
    pub async fn prime(&mut self) -> CatalogResult<()> {
        self.known = self.fingerprints().await?;
        Ok(())
    }

    /// Diff the directory against the previous scan and publish the changes.
    ///
    /// # Errors
    ///
    /// Returns the directory listing failure; the previous baseline is kept.
    pub async fn scan(&mut self) -> CatalogResult<Vec<Event>> {
        let current = self.fingerprints().await?;
        let mut changes = Vec::new();

        for (path, (code, fingerprint)) in &current {
            let unchanged = self
                .known
                .get(path)
                .is_some_and(|(_, previous)| previous == fingerprint);
            if !unchanged {
                changes.push(Event::CatalogChanged {
                    code: code.clone(),
                    path: path.display().to_string(),
                });
            }
        }
        for (path, (code, _)) in &self.known {
            if !current.contains_key(path) {
                changes.push(Event::CatalogRemoved {
                    code: code.clone(),
                    path: path.display().to_string(),
                });
            }
        }
        self.known = current;

        for event in &changes {
            debug!(kind = event.kind(), code = event.code(), "catalog change detected");
            self.metrics.inc_event(event.kind());
            self.events.publish(event.clone());
        }
        Ok(changes)
    }

    /// Run the watcher on its own task until the runtime shuts down.
    #[must_use]
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.prime().await {
                warn!(error = %err, "catalog watcher baseline scan failed");
            }
            let mut poll = tokio::time::interval(self.interval);
            poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
            poll.tick().await;
            loop {
                poll.tick().await;
                if let Err(err) = self.scan().await {
                    warn!(error = %err, "catalog watcher scan failed");
                }
            }
        })
    }

    async fn fingerprints(&self) -> CatalogResult<BTreeMap<PathBuf, (String, Fingerprint)>> {
        let mut fingerprints = BTreeMap::new();
        for (code, path) in self.repository.catalog_files().await? {
            // Vanished between listing and stat; reported as removed next time.
            let Ok(metadata) = fs::metadata(&path).await else {
                continue;
            };
            let fingerprint = Fingerprint {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            };
            fingerprints.insert(path, (code, fingerprint));
        }
        Ok(fingerprints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageNames;
    use tempfile::TempDir;

    fn watcher(dir: &TempDir) -> anyhow::Result<(CatalogWatcher, EventBus)> {
        let events = EventBus::new();
        let watcher = CatalogWatcher::new(
            CatalogRepository::new(dir.path(), LanguageNames::builtin()),
            events.clone(),
            Metrics::new()?,
            Duration::from_millis(50),
        );
        Ok((watcher, events))
    }

    #[tokio::test]
    async fn first_scan_after_prime_is_quiet() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("fr.po"), "msgid \"a\"\nmsgstr \"\"\n")?;
        let (mut watcher, events) = watcher(&dir)?;
        watcher.prime().await?;
        assert!(watcher.scan().await?.is_empty());
        assert!(events.last_event_id().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn reports_added_modified_and_removed_catalogs() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let fr = dir.path().join("fr.po");
        std::fs::write(&fr, "msgid \"a\"\nmsgstr \"\"\n")?;
        let (mut watcher, events) = watcher(&dir)?;
        watcher.prime().await?;

        std::fs::write(dir.path().join("de.po"), "msgid \"a\"\nmsgstr \"\"\n")?;
        std::fs::write(&fr, "msgid \"a\"\nmsgstr \"b\"\n")?;
        let kinds: Vec<(&str, String)> = watcher
            .scan()
            .await?
            .iter()
            .map(|event| (event.kind(), event.code().to_string()))
            .collect();
        assert_eq!(
            kinds,
            [
                ("catalog_changed", "de".to_string()),
                ("catalog_changed", "fr".to_string()),
            ]
        );

        std::fs::remove_file(&fr)?;
        let removed = watcher.scan().await?;
        assert!(matches!(
            removed.as_slice(),
            [Event::CatalogRemoved { code, .. }] if code == "fr"
        ));
        assert_eq!(events.last_event_id(), Some(3));
        Ok(())
    }
}
