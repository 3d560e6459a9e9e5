#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Translation catalog engine: gettext `.po` codec, per-language repository,
//! serialized read-modify-write mutator, search, and a polling change watcher.
//!
//! Layout: `codec/` (document model, parser, writer), `model.rs` (entry and
//! statistics types), `languages.rs` (display-name table), `repository.rs`
//! (discovery and loading), `locks.rs` (per-path exclusive access),
//! `mutator.rs` (update cycle and atomic replace), `query.rs` (search and
//! listing), `watcher.rs`, `service.rs` (facade by language code), `error.rs`.

pub mod codec;
pub mod error;
pub mod languages;
pub mod locks;
pub mod model;
pub mod mutator;
pub mod query;
pub mod repository;
pub mod service;
pub mod watcher;

pub use codec::{Encoded, decode, encode};
pub use error::{CatalogError, CatalogResult};
pub use languages::{BUILTIN_LANGUAGE_NAMES, LanguageNames};
pub use locks::{ExclusiveAccess, PathGuard, PathLocks};
pub use model::{
    Annotations, EntryKey, FUZZY_FLAG, LanguageCatalog, LanguageSummary, Progress, SearchHit,
    TranslationEntry, TranslationUpdate, UpdateReport,
};
pub use mutator::{TranslationMutator, write_atomic};
pub use repository::{CATALOG_EXTENSION, CatalogRepository, language_code, validate_language_code};
pub use service::CatalogService;
pub use watcher::CatalogWatcher;
