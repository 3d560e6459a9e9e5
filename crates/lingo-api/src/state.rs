//! Shared state handed to every handler.

use lingo_events::EventBus;
use lingo_telemetry::Metrics;

use crate::catalog::SharedCatalog;

/// Dependencies shared by the HTTP handlers.
pub struct ApiState {
    pub(crate) catalog: SharedCatalog,
    pub(crate) telemetry: Metrics,
    pub(crate) events: EventBus,
}

impl ApiState {
    /// Bundle the catalog backend, metrics and event bus.
    #[must_use]
    pub fn new(catalog: SharedCatalog, telemetry: Metrics, events: EventBus) -> Self {
        Self {
            catalog,
            telemetry,
            events,
        }
    }
}
