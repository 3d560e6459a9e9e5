//! Read-modify-write cycle for catalog updates.
//!
//! # Design
//! - One cycle per file at a time, enforced through [`ExclusiveAccess`] on the
//!   canonical path.
//! - The cycle runs on a detached task: dropping the caller's future does not
//!   interrupt a write that has started.
//! - Persisting is an atomic replace through a sibling temp file; the original
//!   permissions carry over.
//! - A cycle that changes no bytes does not touch the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use lingo_events::{Event, EventBus};
use lingo_telemetry::{Metrics, WriteOutcome, current_request_id};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::codec::{self, Encoded};
use crate::error::{CatalogError, CatalogResult};
use crate::locks::ExclusiveAccess;
use crate::model::{TranslationUpdate, UpdateReport};
use crate::repository::language_code;

/// Applies update batches to catalog files.
#[derive(Clone)]
pub struct TranslationMutator {
    locks: Arc<dyn ExclusiveAccess>,
    events: EventBus,
    metrics: Metrics,
}

impl TranslationMutator {
    /// Mutator serializing writes through `locks` and announcing them on `events`.
    #[must_use]
    pub fn new(locks: Arc<dyn ExclusiveAccess>, events: EventBus, metrics: Metrics) -> Self {
        Self {
            locks,
            events,
            metrics,
        }
    }

    /// Apply `updates` to the catalog at `path`.
    ///
    /// Updates addressing entries absent from the file are ignored and counted
    /// in the returned report.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidInput`] for an empty batch, an empty `msgid`, or an
    ///   update carrying neither `msgstr` nor `fuzzy`.
    /// - [`CatalogError::NotFound`] when `path` does not exist.
    /// - [`CatalogError::Parse`], [`CatalogError::Io`] or [`CatalogError::TaskJoin`]
    ///   when the cycle fails.
    pub async fn apply_updates(
        &self,
        path: &Path,
        updates: Vec<TranslationUpdate>,
    ) -> CatalogResult<UpdateReport> {
        validate_updates(&updates)?;
        let canonical = fs::canonicalize(path)
            .await
            .map_err(|err| CatalogError::read("catalog.canonicalize", path, err))?;

        // Task-locals do not cross `tokio::spawn`; capture the id for the span.
        let request_id = current_request_id();
        let span = info_span!(
            "catalog.write",
            path = %canonical.display(),
            request_id = request_id.as_deref().unwrap_or("-"),
            updates = updates.len(),
        );
        let cycle = WriteCycle {
            locks: Arc::clone(&self.locks),
            events: self.events.clone(),
            metrics: self.metrics.clone(),
            path: canonical,
            updates,
        };
        tokio::spawn(cycle.run().instrument(span))
            .await
            .map_err(|source| CatalogError::TaskJoin {
                operation: "catalog.apply_updates",
                source,
            })?
    }

    /// Replace the target of one entry.
    ///
    /// # Errors
    ///
    /// Same as [`TranslationMutator::apply_updates`].
    pub async fn apply_single_update(
        &self,
        path: &Path,
        identifier: impl Into<String>,
        target: impl Into<String>,
        context: Option<String>,
    ) -> CatalogResult<UpdateReport> {
        let update = TranslationUpdate {
            identifier: identifier.into(),
            target: Some(target.into()),
            context,
            fuzzy: None,
        };
        self.apply_updates(path, vec![update]).await
    }
}

struct WriteCycle {
    locks: Arc<dyn ExclusiveAccess>,
    events: EventBus,
    metrics: Metrics,
    path: PathBuf,
    updates: Vec<TranslationUpdate>,
}

impl WriteCycle {
    async fn run(self) -> CatalogResult<UpdateReport> {
        let started = Instant::now();
        let _guard = self.locks.acquire(&self.path).await;

        match self.merge_and_persist().await {
            Ok((report, written)) => {
                let outcome = if written {
                    WriteOutcome::Written
                } else {
                    WriteOutcome::Unchanged
                };
                self.metrics.record_catalog_write(outcome, started.elapsed());
                self.metrics.record_patches(report.applied, report.ignored);
                if report.ignored > 0 {
                    debug!(ignored = ?report.ignored_entries, "updates without a matching entry");
                }
                if written {
                    self.announce(&report);
                }
                info!(
                    applied = report.applied,
                    ignored = report.ignored,
                    written,
                    "catalog updates applied"
                );
                Ok(report)
            }
            Err(err) => {
                self.metrics
                    .record_catalog_write(WriteOutcome::Failed, started.elapsed());
                warn!(error = %err, "catalog write cycle failed");
                Err(err)
            }
        }
    }

    async fn merge_and_persist(&self) -> CatalogResult<(UpdateReport, bool)> {
        let existing = fs::read(&self.path)
            .await
            .map_err(|err| CatalogError::read("catalog.read", &self.path, err))?;
        let Encoded { bytes, report } =
            codec::encode(&existing, &self.updates).map_err(|err| err.with_path(&self.path))?;
        if report.applied == 0 || bytes == existing {
            return Ok((report, false));
        }
        write_atomic(&self.path, &bytes).await?;
        Ok((report, true))
    }

    fn announce(&self, report: &UpdateReport) {
        let event = Event::CatalogUpdated {
            code: language_code(&self.path)
                .unwrap_or_else(|| self.path.display().to_string()),
            applied: report.applied,
            ignored: report.ignored,
        };
        self.metrics.inc_event(event.kind());
        self.events.publish(event);
    }
}

fn validate_updates(updates: &[TranslationUpdate]) -> CatalogResult<()> {
    if updates.is_empty() {
        return Err(CatalogError::invalid(
            "updates",
            "at least one update is required",
            None,
        ));
    }
    for update in updates {
        if update.identifier.is_empty() {
            return Err(CatalogError::invalid("msgid", "must not be empty", None));
        }
        if update.target.is_none() && update.fuzzy.is_none() {
            return Err(CatalogError::invalid(
                "msgstr",
                "msgstr or fuzzy is required",
                Some(&update.identifier),
            ));
        }
    }
    Ok(())
}

/// Replace `path` with `bytes` through a sibling temp file and a rename.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] naming the failed step; the temp file is removed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> CatalogResult<()> {
    let temp = temp_path(path);
    let result = persist(path, &temp, bytes).await;
    if result.is_err() {
        let _ = fs::remove_file(&temp).await;
    }
    result
}

async fn persist(path: &Path, temp: &Path, bytes: &[u8]) -> CatalogResult<()> {
    let permissions = fs::metadata(path)
        .await
        .map_err(|err| CatalogError::io("catalog.metadata", path, err))?
        .permissions();

    let mut file = fs::File::create(temp)
        .await
        .map_err(|err| CatalogError::io("catalog.create_temp", temp, err))?;
    file.write_all(bytes)
        .await
        .map_err(|err| CatalogError::io("catalog.write_temp", temp, err))?;
    file.flush()
        .await
        .map_err(|err| CatalogError::io("catalog.write_temp", temp, err))?;
    file.sync_all()
        .await
        .map_err(|err| CatalogError::io("catalog.sync_temp", temp, err))?;
    drop(file);

    fs::set_permissions(temp, permissions)
        .await
        .map_err(|err| CatalogError::io("catalog.set_permissions", temp, err))?;
    fs::rename(temp, path)
        .await
        .map_err(|err| CatalogError::io("catalog.rename", path, err))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "catalog".to_string(), |name| name.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::PathLocks;
    use tempfile::TempDir;

    const FR: &str = "msgid \"\"\nmsgstr \"Language: fr\\n\"\n\n#: src/app.rs:3\nmsgid \"Hello\"\nmsgstr \"\"\n\nmsgid \"Bye\"\nmsgstr \"Salut\"\n";

    fn mutator() -> anyhow::Result<(TranslationMutator, EventBus, Metrics)> {
        let events = EventBus::new();
        let metrics = Metrics::new()?;
        let mutator = TranslationMutator::new(
            Arc::new(PathLocks::new()),
            events.clone(),
            metrics.clone(),
        );
        Ok((mutator, events, metrics))
    }

    fn fixture() -> anyhow::Result<(TempDir, PathBuf)> {
        let dir = TempDir::new()?;
        let path = dir.path().join("fr.po");
        std::fs::write(&path, FR)?;
        Ok((dir, path))
    }

    #[tokio::test]
    async fn applies_and_announces_a_write() -> anyhow::Result<()> {
        let (dir, path) = fixture()?;
        let (mutator, events, metrics) = mutator()?;

        let report = mutator
            .apply_single_update(&path, "Hello", "Bonjour", None)
            .await?;
        assert_eq!(report.applied, 1);
        assert_eq!(report.ignored, 0);

        let entries = codec::decode(&std::fs::read(&path)?)?;
        assert_eq!(entries[0].target, "Bonjour");
        assert_eq!(entries[1].target, "Salut");

        let mut stream = events.subscribe(Some(0));
        let envelope = stream.next().await.ok_or_else(|| anyhow::anyhow!("no event"))?;
        assert_eq!(
            envelope.event,
            Event::CatalogUpdated {
                code: "fr".into(),
                applied: 1,
                ignored: 0,
            }
        );
        assert_eq!(metrics.snapshot().patches_applied_total, 1);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())?.collect::<Result<_, _>>()?;
        assert_eq!(leftovers.len(), 1, "temp files must not linger");
        Ok(())
    }

    #[tokio::test]
    async fn unmatched_updates_leave_the_file_alone() -> anyhow::Result<()> {
        let (_dir, path) = fixture()?;
        let (mutator, events, metrics) = mutator()?;

        let report = mutator
            .apply_updates(&path, vec![TranslationUpdate::target("Missing", "x")])
            .await?;
        assert_eq!(report.applied, 0);
        assert_eq!(report.ignored, 1);
        assert_eq!(std::fs::read_to_string(&path)?, FR);
        assert!(events.last_event_id().is_none());
        assert_eq!(metrics.snapshot().patches_ignored_total, 1);
        assert!(metrics.render()?.contains("outcome=\"unchanged\""));
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_not_found() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let (mutator, _, _) = mutator()?;
        let err = mutator
            .apply_single_update(&dir.path().join("ja.po"), "Hello", "こんにちは", None)
            .await
            .expect_err("missing catalog");
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(!dir.path().join("ja.po").exists());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_batches_are_rejected_before_io() -> anyhow::Result<()> {
        let (mutator, _, _) = mutator()?;
        let path = Path::new("/nonexistent/fr.po");

        let empty = mutator.apply_updates(path, Vec::new()).await;
        assert!(matches!(empty, Err(CatalogError::InvalidInput { field: "updates", .. })));

        let blank_id = mutator
            .apply_updates(path, vec![TranslationUpdate::target("", "x")])
            .await;
        assert!(matches!(blank_id, Err(CatalogError::InvalidInput { field: "msgid", .. })));

        let no_change = TranslationUpdate {
            identifier: "Hello".into(),
            target: None,
            context: None,
            fuzzy: None,
        };
        let nothing = mutator.apply_updates(path, vec![no_change]).await;
        assert!(matches!(nothing, Err(CatalogError::InvalidInput { field: "msgstr", .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn permissions_survive_the_replace() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = fixture()?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640))?;
        let (mutator, _, _) = mutator()?;
        mutator
            .apply_updates(&path, vec![TranslationUpdate::fuzzy("Bye", true)])
            .await?;
        let mode = std::fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        Ok(())
    }

    #[test]
    fn temp_files_are_hidden_siblings() {
        let temp = temp_path(Path::new("/locales/fr.po"));
        assert_eq!(temp.parent(), Some(Path::new("/locales")));
        let name = temp
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert!(name.starts_with(".fr.po."));
        assert!(name.ends_with(".tmp"));
        assert_eq!(language_code(&temp), None);
    }
}
