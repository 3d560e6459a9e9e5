//! # Design
//!
//! - Provide structured, constant-message errors for the catalog engine.
//! - Capture context (paths, line numbers, fields) so callers can build their own messages.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors produced by the catalog engine.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog bytes are not a well-formed `.po` document.
    #[error("catalog parse failure")]
    Parse {
        /// File being decoded, when known.
        path: Option<PathBuf>,
        /// 1-based line number where decoding stopped.
        line: usize,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// The referenced catalog file does not exist.
    #[error("catalog not found")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// Caller-supplied input failed validation.
    #[error("catalog invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// IO failures while reading or persisting catalogs.
    #[error("catalog io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A detached write cycle panicked or was aborted.
    #[error("catalog task failure")]
    TaskJoin {
        /// Operation running on the task.
        operation: &'static str,
        /// Underlying join error.
        source: tokio::task::JoinError,
    },
}

impl CatalogError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Map a read failure, turning `ENOENT` into [`CatalogError::NotFound`].
    pub(crate) fn read(operation: &'static str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::io(operation, path, source)
        }
    }

    pub(crate) const fn parse(line: usize, reason: &'static str) -> Self {
        Self::Parse {
            path: None,
            line,
            reason,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: Option<&str>) -> Self {
        Self::InvalidInput {
            field,
            reason,
            value: value.map(str::to_string),
        }
    }

    /// Attach the file path to a parse error; other variants pass through unchanged.
    #[must_use]
    pub fn with_path(self, file: &Path) -> Self {
        match self {
            Self::Parse { line, reason, .. } => Self::Parse {
                path: Some(file.to_path_buf()),
                line,
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_are_constant_and_sources_preserved() -> Result<(), Box<dyn Error>> {
        let io_err = CatalogError::io("catalog.read", "locales/fr.po", io::Error::other("disk"));
        assert_eq!(io_err.to_string(), "catalog io failure");
        assert!(io_err.source().is_some());

        let parse = CatalogError::parse(7, "unterminated string");
        assert_eq!(parse.to_string(), "catalog parse failure");
        assert!(parse.source().is_none());

        let invalid = CatalogError::invalid("msgid", "must not be empty", Some(""));
        assert_eq!(invalid.to_string(), "catalog invalid input");
        Ok(())
    }

    #[test]
    fn read_maps_missing_files_to_not_found() {
        let missing = CatalogError::read(
            "catalog.read",
            Path::new("locales/xx.po"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(missing, CatalogError::NotFound { ref path } if path == Path::new("locales/xx.po")));

        let denied = CatalogError::read(
            "catalog.read",
            Path::new("locales/xx.po"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, CatalogError::Io { operation: "catalog.read", .. }));
    }

    #[test]
    fn with_path_only_decorates_parse_errors() {
        let parse = CatalogError::parse(3, "msgstr without msgid").with_path(Path::new("de.po"));
        assert!(matches!(
            parse,
            CatalogError::Parse { path: Some(ref path), line: 3, .. } if path == Path::new("de.po")
        ));

        let not_found = CatalogError::NotFound {
            path: PathBuf::from("x.po"),
        }
        .with_path(Path::new("y.po"));
        assert!(matches!(not_found, CatalogError::NotFound { ref path } if path == Path::new("x.po")));
    }
}
