//! Server-sent events stream of catalog changes.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{self, Sse},
};
use futures_util::{StreamExt, future};
use lingo_events::{EventBus, EventEnvelope, EventId};
use serde::Deserialize;
use tracing::error;

use crate::http::constants::{HEADER_LAST_EVENT_ID, SSE_KEEP_ALIVE_SECS};
use crate::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SseQuery {
    /// Comma-separated language codes; absent means every language.
    #[serde(default)]
    pub(crate) lang: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SseFilter {
    pub(crate) languages: HashSet<String>,
}

impl SseFilter {
    pub(crate) fn from_query(query: &SseQuery) -> Self {
        let languages = query
            .lang
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();
        Self { languages }
    }

    pub(crate) fn matches(&self, envelope: &EventEnvelope) -> bool {
        self.languages.is_empty() || self.languages.contains(envelope.event.code())
    }
}

pub(crate) async fn stream_events(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(query): Query<SseQuery>,
) -> Sse<impl futures_core::Stream<Item = Result<sse::Event, Infallible>> + Send> {
    let last_id = headers
        .get(HEADER_LAST_EVENT_ID)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<EventId>().ok());

    let stream = event_sse_stream(state.events.clone(), last_id, SseFilter::from_query(&query));

    Sse::new(stream).keep_alive(
        sse::KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}

pub(crate) fn event_replay_stream(
    bus: EventBus,
    since: Option<EventId>,
) -> impl futures_core::Stream<Item = EventEnvelope> + Send {
    stream! {
        let mut events = bus.subscribe(since);
        while let Some(envelope) = events.next().await {
            yield envelope;
        }
    }
}

pub(crate) fn event_sse_stream(
    bus: EventBus,
    since: Option<EventId>,
    filter: SseFilter,
) -> impl futures_core::Stream<Item = Result<sse::Event, Infallible>> + Send {
    event_replay_stream(bus, since)
        .filter(move |envelope| future::ready(filter.matches(envelope)))
        .filter_map(|envelope| async move {
            match serde_json::to_string(&envelope) {
                Ok(payload) => Some(Ok(sse::Event::default()
                    .id(envelope.id.to_string())
                    .event(envelope.event.kind())
                    .data(payload))),
                Err(err) => {
                    error!(error = %err, "failed to serialise SSE event payload");
                    None
                }
            }
        })
}
