//! Typed configuration models.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Default locales directory, relative to the working directory.
pub const DEFAULT_LOCALES_DIR: &str = "./locales";
/// Default mount point of the editor and its API.
pub const DEFAULT_ROUTE: &str = "/_translations";
/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 5174;
/// Default poll interval of the catalog watcher.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(1_000);
/// Default log level directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fully resolved application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Listener settings.
    pub server: ServerSettings,
    /// Catalog discovery and routing settings.
    pub catalog: CatalogSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSettings {
    /// Interface the listener binds to.
    pub bind_addr: IpAddr,
    /// TCP port the listener binds to.
    pub port: u16,
}

impl ServerSettings {
    /// Socket address combining bind address and port.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Catalog discovery and routing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSettings {
    /// Directory scanned for `<code>.po` files.
    pub locales_dir: PathBuf,
    /// Mount point, without trailing slash. The API lives under `<route>/api`.
    pub route: String,
    /// Display-name overrides layered over the built-in language table.
    pub language_names: Vec<(String, String)>,
    /// Poll interval of the catalog watcher; `None` disables watching.
    pub watch_interval: Option<Duration>,
}

impl CatalogSettings {
    /// Prefix under which API routes are mounted.
    #[must_use]
    pub fn api_prefix(&self) -> String {
        format!("{}/api", self.route)
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            locales_dir: PathBuf::from(DEFAULT_LOCALES_DIR),
            route: DEFAULT_ROUTE.to_string(),
            language_names: Vec::new(),
            watch_interval: Some(DEFAULT_WATCH_INTERVAL),
        }
    }
}

/// Logging settings; the format string is interpreted by the telemetry crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingSettings {
    /// Level directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Requested output format (`json` or `pretty`); `None` infers from the build.
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: None,
        }
    }
}
