//! Temporary locales directories populated with catalogs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// A locales directory that is deleted when the fixture drops.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    /// Create an empty locales directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to create temporary locales directory")?;
        Ok(Self { dir })
    }

    /// Create a locales directory holding `(code, contents)` catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any catalog cannot be written.
    pub fn with_catalogs(catalogs: &[(&str, &str)]) -> Result<Self> {
        let fixture = Self::new()?;
        for (code, contents) in catalogs {
            fixture.write(code, contents)?;
        }
        Ok(fixture)
    }

    /// Locales directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the catalog for `code`, whether or not it exists.
    #[must_use]
    pub fn catalog_path(&self, code: &str) -> PathBuf {
        self.dir.path().join(format!("{code}.po"))
    }

    /// Write (or overwrite) the catalog for `code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, code: &str, contents: &str) -> Result<PathBuf> {
        let path = self.catalog_path(code);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write catalog {}", path.display()))?;
        Ok(path)
    }

    /// Current contents of the catalog for `code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, code: &str) -> Result<String> {
        let path = self.catalog_path(code);
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read catalog {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::FR_HELLO_UNTRANSLATED;

    #[test]
    fn catalogs_are_written_under_their_code() -> Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("fr", FR_HELLO_UNTRANSLATED)])?;
        assert!(fixture.catalog_path("fr").is_file());
        assert_eq!(fixture.read("fr")?, FR_HELLO_UNTRANSLATED);
        assert!(fixture.read("de").is_err());
        Ok(())
    }

    #[test]
    fn directory_is_removed_on_drop() -> Result<()> {
        let fixture = CatalogFixture::new()?;
        let path = fixture.path().to_path_buf();
        drop(fixture);
        assert!(!path.exists());
        Ok(())
    }
}
