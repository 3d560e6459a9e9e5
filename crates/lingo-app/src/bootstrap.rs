use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use lingo_api::ApiServer;
use lingo_catalog::{CatalogService, LanguageNames};
use lingo_config::AppConfig;
use lingo_events::EventBus;
use lingo_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Build identifier baked in at compile time, `dev` when absent.
const BUILD_SHA: &str = match option_env!("LINGO_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Dependencies required to bootstrap the catalog server.
pub(crate) struct BootstrapDependencies {
    config: AppConfig,
    events: EventBus,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            AppConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        Self::from_config(config)
    }

    pub(crate) fn from_config(config: AppConfig) -> AppResult<Self> {
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            config,
            events: EventBus::new(),
            telemetry,
        })
    }
}

/// Entry point for the Lingo boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed,
/// or the API listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    let format = resolve_log_format(dependencies.config.logging.format.as_deref())?;
    lingo_telemetry::init_logging(&LoggingConfig {
        level: &dependencies.config.logging.level,
        format,
        build_sha: BUILD_SHA,
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context =
        GlobalContextGuard::new(dependencies.config.catalog.locales_dir.display().to_string());

    info!("Lingo bootstrap starting");
    run_app_with(dependencies, shutdown_signal()).await
}

/// Boot sequence over injected dependencies; returns once `shutdown` resolves.
pub(crate) async fn run_app_with(
    dependencies: BootstrapDependencies,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        events,
        telemetry,
    } = dependencies;

    let locales_dir = config.catalog.locales_dir.clone();
    if !tokio::fs::metadata(&locales_dir)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
    {
        warn!(
            locales_dir = %locales_dir.display(),
            "locales directory is missing; catalogs will be empty until it is created"
        );
    }

    let names = LanguageNames::with_overrides(config.catalog.language_names.clone());
    let service = CatalogService::new(locales_dir, names, events.clone(), telemetry.clone());
    let watcher = config.catalog.watch_interval.map(|interval| {
        info!(interval_ms = interval.as_millis(), "catalog watcher enabled");
        service.watcher(interval).spawn()
    });

    let addr = config.server.socket_addr();
    if is_exposed(addr.ip()) {
        warn!(
            bind_addr = %addr.ip(),
            "binding a non-loopback address; the translation API has no authentication"
        );
    }

    let api_prefix = config.catalog.api_prefix();
    let api = ApiServer::new(Arc::new(service), events, telemetry, &api_prefix);
    info!(addr = %addr, api_prefix = %api_prefix, "Launching API listener");
    let serve_result = api.serve(addr, shutdown).await;

    if let Some(watcher) = watcher {
        watcher.abort();
    }

    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

fn resolve_log_format(requested: Option<&str>) -> AppResult<LogFormat> {
    requested.map_or_else(
        || Ok(LogFormat::infer()),
        |value| {
            value
                .parse()
                .map_err(|err| AppError::telemetry("telemetry.log_format", err))
        },
    )
}

const fn is_exposed(bind_addr: IpAddr) -> bool {
    !bind_addr.is_loopback()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_test_support::CatalogFixture;
    use lingo_test_support::samples::FR_HELLO_UNTRANSLATED;
    use std::net::{Ipv4Addr, TcpListener};

    fn config_for(fixture: &CatalogFixture, port: u16) -> AppConfig {
        let mut config = AppConfig::default();
        config.catalog.locales_dir = fixture.path().to_path_buf();
        config.catalog.watch_interval = None;
        config.server.port = port;
        config
    }

    #[test]
    fn log_format_defaults_to_build_inference() -> anyhow::Result<()> {
        assert_eq!(resolve_log_format(None)?, LogFormat::infer());
        assert_eq!(resolve_log_format(Some("json"))?, LogFormat::Json);
        assert!(matches!(
            resolve_log_format(Some("xml")),
            Err(AppError::Telemetry { .. })
        ));
        Ok(())
    }

    #[test]
    fn only_loopback_addresses_are_private() {
        assert!(!is_exposed(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert!(!is_exposed("::1".parse().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))));
        assert!(is_exposed(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
        assert!(is_exposed(IpAddr::from([192, 168, 1, 20])));
    }

    #[tokio::test]
    async fn serves_until_shutdown_resolves() -> anyhow::Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("fr", FR_HELLO_UNTRANSLATED)])?;
        let mut config = config_for(&fixture, 0);
        config.catalog.watch_interval = Some(std::time::Duration::from_millis(20));
        let dependencies = BootstrapDependencies::from_config(config)?;
        run_app_with(dependencies, std::future::ready(())).await?;
        Ok(())
    }

    #[tokio::test]
    async fn occupied_port_surfaces_bind_failure() -> anyhow::Result<()> {
        let fixture = CatalogFixture::new()?;
        let occupied = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
        let port = occupied.local_addr()?.port();
        let dependencies = BootstrapDependencies::from_config(config_for(&fixture, port))?;

        let result = run_app_with(dependencies, std::future::ready(())).await;
        assert!(matches!(
            result,
            Err(AppError::ApiServer {
                source: lingo_api::ApiServerError::Bind { .. },
                ..
            })
        ));
        Ok(())
    }
}
