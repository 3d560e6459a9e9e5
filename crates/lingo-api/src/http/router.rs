//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, Request, header::CONTENT_TYPE},
    routing::{get, put},
};
use lingo_events::EventBus;
use lingo_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info};

use crate::catalog::SharedCatalog;
use crate::error::{ApiServerError, ApiServerResult};
use crate::http::catalog::{
    api_fallback, get_translations, list_languages, put_translation, put_translations, search,
};
use crate::http::constants::{HEADER_LAST_EVENT_ID, HEADER_REQUEST_ID};
use crate::http::health::{health, metrics};
use crate::http::sse::stream_events;
use crate::http::telemetry::HttpMetricsLayer;
use crate::state::ApiState;

/// Axum router wrapper that hosts the translation API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Wire the catalog routes under `api_prefix` (for example
    /// `/_translations/api`) next to the operational `/health` and `/metrics`.
    #[must_use]
    pub fn new(
        catalog: SharedCatalog,
        events: EventBus,
        telemetry: Metrics,
        api_prefix: &str,
    ) -> Self {
        let state = Arc::new(ApiState::new(catalog, telemetry.clone(), events));
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, HeaderName::from_static(HEADER_LAST_EVENT_ID)]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        // The id must be set before the propagation layer sees the request.
        let layered = ServiceBuilder::new()
            .layer(lingo_telemetry::set_request_id_layer())
            .layer(lingo_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::public_routes()
            .nest(api_prefix, Self::catalog_routes())
            .layer(cors_layer)
            .layer(layered)
            .with_state(state);

        Self { router }
    }

    fn public_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    fn catalog_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/languages", get(list_languages))
            .route(
                "/translations/{lang}",
                get(get_translations).put(put_translations),
            )
            .route(
                "/translation/{lang}/{*msgid}",
                put(put_translation),
            )
            .route("/search", get(search))
            .route("/events", get(stream_events))
            .fallback(api_fallback)
    }

    /// Serve the API on `addr` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Bind`] if the listener cannot be bound and
    /// [`ApiServerError::Serve`] if the server terminates unexpectedly.
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> ApiServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(addr = %addr, "translation api listening");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}
