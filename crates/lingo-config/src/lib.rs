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

//! Environment-driven configuration for the Lingo server.
//!
//! Layout: `model.rs` (typed settings), `loader.rs` (environment lookup and
//! defaults), `validate.rs` (field parsers), `error.rs`.

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_BIND_ADDR, ENV_HTTP_PORT, ENV_LANGUAGE_NAMES, ENV_LOCALES_DIR, ENV_LOG_FORMAT,
    ENV_LOG_LEVEL, ENV_ROUTE, ENV_WATCH_INTERVAL_MS,
};
pub use model::{AppConfig, CatalogSettings, LoggingSettings, ServerSettings};
