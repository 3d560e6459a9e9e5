//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration stays private; callers use typed recording methods.
//! - Counters cover the HTTP surface and the catalog write path.

use std::sync::Arc;
use std::time::Duration;

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    catalog_writes_total: IntCounterVec,
    catalog_events_total: IntCounterVec,
    patches_applied_total: IntCounter,
    patches_ignored_total: IntCounter,
    catalog_write_latency_ms: IntGauge,
    languages_loaded: IntGauge,
}

/// Result of one catalog write cycle, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The catalog was rewritten.
    Written,
    /// No patch changed the catalog, so nothing was written.
    Unchanged,
    /// The cycle failed before the rename completed.
    Failed,
}

impl WriteOutcome {
    const fn as_label(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Unchanged => "unchanged",
            Self::Failed => "failed",
        }
    }
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Patches that matched an entry since startup.
    pub patches_applied_total: u64,
    /// Patches ignored because their entry was absent.
    pub patches_ignored_total: u64,
    /// Duration of the most recent catalog write cycle.
    pub last_write_latency_ms: i64,
    /// Number of catalogs seen by the most recent listing.
    pub languages_loaded: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let catalog_writes_total = counter_vec(
            "catalog_writes_total",
            "Catalog write cycles by outcome",
            &["outcome"],
        )?;
        let catalog_events_total = counter_vec(
            "catalog_events_total",
            "Catalog events published by type",
            &["type"],
        )?;
        let patches_applied_total = IntCounter::with_opts(Opts::new(
            "catalog_patches_applied_total",
            "Translation patches applied to an existing entry",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "catalog_patches_applied_total",
            source,
        })?;
        let patches_ignored_total = IntCounter::with_opts(Opts::new(
            "catalog_patches_ignored_total",
            "Translation patches ignored because the entry was absent",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "catalog_patches_ignored_total",
            source,
        })?;
        let catalog_write_latency_ms = IntGauge::with_opts(Opts::new(
            "catalog_write_latency_ms",
            "Duration of the most recent catalog write cycle (ms)",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "catalog_write_latency_ms",
            source,
        })?;
        let languages_loaded = IntGauge::with_opts(Opts::new(
            "catalog_languages_loaded",
            "Catalog files found by the most recent listing",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "catalog_languages_loaded",
            source,
        })?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "catalog_writes_total", &catalog_writes_total)?;
        register(&registry, "catalog_events_total", &catalog_events_total)?;
        register(
            &registry,
            "catalog_patches_applied_total",
            &patches_applied_total,
        )?;
        register(
            &registry,
            "catalog_patches_ignored_total",
            &patches_ignored_total,
        )?;
        register(
            &registry,
            "catalog_write_latency_ms",
            &catalog_write_latency_ms,
        )?;
        register(&registry, "catalog_languages_loaded", &languages_loaded)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                catalog_writes_total,
                catalog_events_total,
                patches_applied_total,
                patches_ignored_total,
                catalog_write_latency_ms,
                languages_loaded,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Record a finished catalog write cycle.
    pub fn record_catalog_write(&self, outcome: WriteOutcome, latency: Duration) {
        self.inner
            .catalog_writes_total
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.inner
            .catalog_write_latency_ms
            .set(Self::duration_to_ms(latency));
    }

    /// Record how many patches of a batch matched and how many were ignored.
    pub fn record_patches(&self, applied: usize, ignored: usize) {
        self.inner
            .patches_applied_total
            .inc_by(u64::try_from(applied).unwrap_or(u64::MAX));
        self.inner
            .patches_ignored_total
            .inc_by(u64::try_from(ignored).unwrap_or(u64::MAX));
    }

    /// Increment the published event counter for the given event type.
    pub fn inc_event(&self, event_type: &str) {
        self.inner
            .catalog_events_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Record the number of catalogs returned by a listing.
    pub fn set_languages_loaded(&self, count: usize) {
        self.inner
            .languages_loaded
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the catalog counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            patches_applied_total: self.inner.patches_applied_total.get(),
            patches_ignored_total: self.inner.patches_ignored_total.get(),
            last_write_latency_ms: self.inner.catalog_write_latency_ms.get(),
            languages_loaded: self.inner.languages_loaded.get(),
        }
    }

    fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_to_ms_saturates_on_large_values() {
        let duration = Duration::from_secs(u64::MAX / 2);
        assert_eq!(Metrics::duration_to_ms(duration), i64::MAX);
    }

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/_translations/api/languages", 200);
        metrics.record_catalog_write(WriteOutcome::Written, Duration::from_millis(12));
        metrics.record_catalog_write(WriteOutcome::Unchanged, Duration::from_millis(3));
        metrics.record_patches(3, 1);
        metrics.record_patches(1, 0);
        metrics.inc_event("catalog_updated");
        metrics.set_languages_loaded(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.patches_applied_total, 4);
        assert_eq!(snapshot.patches_ignored_total, 1);
        assert_eq!(snapshot.last_write_latency_ms, 3);
        assert_eq!(snapshot.languages_loaded, 4);

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("catalog_writes_total{outcome=\"written\"} 1"));
        assert!(rendered.contains("catalog_events_total"));
        Ok(())
    }
}
