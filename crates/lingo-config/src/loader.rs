//! Environment lookup and defaults.

use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigResult;
use crate::model::AppConfig;
use crate::validate::{
    normalize_route, parse_bind_addr, parse_language_names, parse_port, parse_watch_interval,
};

/// Directory containing `<code>.po` catalogs.
pub const ENV_LOCALES_DIR: &str = "LINGO_LOCALES_DIR";
/// Mount route of the editor and API.
pub const ENV_ROUTE: &str = "LINGO_ROUTE";
/// Listener interface.
pub const ENV_BIND_ADDR: &str = "LINGO_BIND_ADDR";
/// Listener port.
pub const ENV_HTTP_PORT: &str = "LINGO_HTTP_PORT";
/// Log level directive used when `RUST_LOG` is unset.
pub const ENV_LOG_LEVEL: &str = "LINGO_LOG_LEVEL";
/// Log output format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "LINGO_LOG_FORMAT";
/// Display-name overrides, `code=Name;code=Name`.
pub const ENV_LANGUAGE_NAMES: &str = "LINGO_LANGUAGE_NAMES";
/// Catalog watcher poll interval in milliseconds, `0` disables.
pub const ENV_WATCH_INTERVAL_MS: &str = "LINGO_WATCH_INTERVAL_MS";

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] for the first variable holding an
    /// unparsable value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] for the first variable holding an
    /// unparsable value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = read(ENV_BIND_ADDR) {
            config.server.bind_addr = parse_bind_addr(ENV_BIND_ADDR, &raw)?;
        }
        if let Some(raw) = read(ENV_HTTP_PORT) {
            config.server.port = parse_port(ENV_HTTP_PORT, &raw)?;
        }
        if let Some(raw) = read(ENV_LOCALES_DIR) {
            config.catalog.locales_dir = PathBuf::from(raw.trim());
        }
        if let Some(raw) = read(ENV_ROUTE) {
            config.catalog.route = normalize_route(ENV_ROUTE, &raw)?;
        }
        if let Some(raw) = read(ENV_LANGUAGE_NAMES) {
            config.catalog.language_names = parse_language_names(ENV_LANGUAGE_NAMES, &raw)?;
        }
        if let Some(raw) = read(ENV_WATCH_INTERVAL_MS) {
            config.catalog.watch_interval = parse_watch_interval(ENV_WATCH_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.logging.level = raw.trim().to_string();
        }
        config.logging.format = read(ENV_LOG_FORMAT).map(|raw| raw.trim().to_string());

        debug!(
            locales_dir = %config.catalog.locales_dir.display(),
            route = %config.catalog.route,
            addr = %config.server.socket_addr(),
            "configuration loaded"
        );
        Ok(config)
    }
}
