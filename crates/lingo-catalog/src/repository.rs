//! Catalog discovery and loading.
//!
//! # Design
//! - One `<code>.po` file per language in a flat directory.
//! - Every call re-reads the files; there is no cache to invalidate.
//! - Listing is fail-fast: the first undecodable file aborts it, naming the file.
//! - A missing directory lists as empty.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::debug;

use crate::codec;
use crate::error::{CatalogError, CatalogResult};
use crate::languages::LanguageNames;
use crate::model::{LanguageCatalog, LanguageSummary, Progress};

/// File extension of catalog files.
pub const CATALOG_EXTENSION: &str = "po";

/// Reads language catalogs from a locales directory.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    root: PathBuf,
    names: Arc<LanguageNames>,
}

impl CatalogRepository {
    /// Repository over `root`, resolving display names through `names`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, names: LanguageNames) -> Self {
        Self {
            root: root.into(),
            names: Arc::new(names),
        }
    }

    /// Locales directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the catalog for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] when `code` could escape the
    /// locales directory or is empty.
    pub fn catalog_path(&self, code: &str) -> CatalogResult<PathBuf> {
        validate_language_code(code)?;
        Ok(self.root.join(format!("{code}.{CATALOG_EXTENSION}")))
    }

    /// Catalog files in the directory as `(code, path)`, sorted by code.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the directory exists but cannot be read.
    pub async fn catalog_files(&self) -> CatalogResult<Vec<(String, PathBuf)>> {
        let mut reader = match fs::read_dir(&self.root).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(CatalogError::io("catalog.read_dir", &self.root, err)),
        };

        let mut files = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| CatalogError::io("catalog.read_dir_entry", &self.root, err))?
        {
            let path = entry.path();
            let Some(code) = language_code(&path) else {
                continue;
            };
            // Follows symlinks; dangling links are skipped.
            match fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => files.push((code, path)),
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(CatalogError::io("catalog.metadata", &path, err)),
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    /// Load every catalog in the directory.
    ///
    /// # Errors
    ///
    /// Propagates the first read or decode failure.
    pub async fn list_languages(&self) -> CatalogResult<Vec<LanguageCatalog>> {
        let files = self.catalog_files().await?;
        let mut languages = Vec::with_capacity(files.len());
        for (code, path) in files {
            languages.push(self.load(code, path).await?);
        }
        debug!(
            locales_dir = %self.root.display(),
            languages = languages.len(),
            "catalogs listed"
        );
        Ok(languages)
    }

    /// Per-language statistics in listing order.
    ///
    /// # Errors
    ///
    /// Propagates the first read or decode failure.
    pub async fn get_stats(&self) -> CatalogResult<Vec<LanguageSummary>> {
        Ok(self
            .list_languages()
            .await?
            .iter()
            .map(LanguageSummary::from)
            .collect())
    }

    /// Load the catalog for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when `<code>.po` does not exist,
    /// [`CatalogError::InvalidInput`] for a malformed code, and read or decode
    /// failures otherwise.
    pub async fn load_language(&self, code: &str) -> CatalogResult<LanguageCatalog> {
        let path = self.catalog_path(code)?;
        self.load(code.to_string(), path).await
    }

    async fn load(&self, code: String, path: PathBuf) -> CatalogResult<LanguageCatalog> {
        let bytes = fs::read(&path)
            .await
            .map_err(|err| CatalogError::read("catalog.read", &path, err))?;
        let entries = codec::decode(&bytes).map_err(|err| err.with_path(&path))?;
        let progress = Progress::from_entries(&entries);
        Ok(LanguageCatalog {
            display_name: self.names.display_name(&code),
            code,
            path,
            entries,
            progress,
        })
    }
}

/// Reject codes that are empty or could address a file outside the directory.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidInput`] describing the violation.
pub fn validate_language_code(code: &str) -> CatalogResult<()> {
    if code.is_empty() {
        return Err(CatalogError::invalid("lang", "must not be empty", None));
    }
    if code.contains(['/', '\\', '\0']) {
        return Err(CatalogError::invalid(
            "lang",
            "must not contain path separators",
            Some(code),
        ));
    }
    if code.contains("..") {
        return Err(CatalogError::invalid("lang", "must not contain '..'", Some(code)));
    }
    Ok(())
}

/// Language code of a catalog path: the stem of a `*.po` file name.
#[must_use]
pub fn language_code(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != CATALOG_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    validate_language_code(stem).ok()?;
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FR: &str = "msgid \"\"\nmsgstr \"Language: fr\\n\"\n\nmsgid \"Hello\"\nmsgstr \"Bonjour\"\n\n#, fuzzy\nmsgid \"Bye\"\nmsgstr \"Salut\"\n\nmsgid \"Thanks\"\nmsgstr \"\"\n";

    fn repository(dir: &TempDir) -> CatalogRepository {
        CatalogRepository::new(dir.path(), LanguageNames::builtin())
    }

    #[tokio::test]
    async fn missing_directory_lists_as_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let repo = CatalogRepository::new(dir.path().join("absent"), LanguageNames::builtin());
        assert!(repo.list_languages().await?.is_empty());
        assert!(repo.get_stats().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn lists_only_po_files_sorted_by_code() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("fr.po"), FR)?;
        std::fs::write(dir.path().join("de.po"), "msgid \"Hello\"\nmsgstr \"\"\n")?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;
        std::fs::write(dir.path().join("fr.pot"), "ignored")?;
        std::fs::create_dir(dir.path().join("nested.po"))?;

        let languages = repository(&dir).list_languages().await?;
        let codes: Vec<&str> = languages.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, ["de", "fr"]);
        assert_eq!(languages[1].display_name, "French");
        Ok(())
    }

    #[tokio::test]
    async fn stats_follow_the_progress_arithmetic() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("fr.po"), FR)?;
        let stats = repository(&dir).get_stats().await?;
        assert_eq!(
            stats,
            vec![LanguageSummary {
                code: "fr".into(),
                name: "French".into(),
                total: 3,
                translated: 1,
                fuzzy: 1,
                untranslated: 1,
                progress: 33,
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn decode_failures_fail_the_listing_and_name_the_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("fr.po"), FR)?;
        std::fs::write(dir.path().join("xx.po"), "msgid \"broken\n")?;
        let err = repository(&dir)
            .list_languages()
            .await
            .expect_err("broken catalog must fail the listing");
        assert!(matches!(
            err,
            CatalogError::Parse { path: Some(ref path), line: 1, .. } if path.ends_with("xx.po")
        ));
        Ok(())
    }

    #[tokio::test]
    async fn missing_language_is_not_found() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let err = repository(&dir)
            .load_language("ja")
            .await
            .expect_err("no catalog for ja");
        assert!(matches!(err, CatalogError::NotFound { .. }));
        Ok(())
    }

    #[test]
    fn language_codes_are_validated() {
        for code in ["", "../fr", "fr/..", "a\\b", "x\0y", ".."] {
            assert!(
                validate_language_code(code).is_err(),
                "expected {code:?} to be rejected"
            );
        }
        assert!(validate_language_code("pt-BR").is_ok());
        assert_eq!(language_code(Path::new("/l/zh-TW.po")).as_deref(), Some("zh-TW"));
        assert_eq!(language_code(Path::new("/l/.fr.po.tmp")), None);
        assert_eq!(language_code(Path::new("/l/fr")), None);
    }
}
