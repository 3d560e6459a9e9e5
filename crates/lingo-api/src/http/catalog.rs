//! Catalog routes: language overview, entry listing, updates and search.
//!
//! # Design
//! - Handlers stay thin: decode the request, call the [`CatalogFacade`],
//!   wrap the result in an [`ApiEnvelope`].
//! - Update bodies are read as raw bytes and decoded here so malformed JSON
//!   surfaces as a 400 problem document instead of the extractor's plain-text
//!   rejection.
//!
//! [`CatalogFacade`]: crate::catalog::CatalogFacade

use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use lingo_catalog::{LanguageSummary, SearchHit, TranslationEntry, UpdateReport};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::http::constants::{MESSAGE_TRANSLATION_UPDATED, MESSAGE_TRANSLATIONS_UPDATED};
use crate::http::errors::{ApiError, CatalogAccess};
use crate::http::telemetry::UnmatchedRoute;
use crate::models::{ApiEnvelope, ProblemInvalidParam, SearchQuery, SingleUpdateRequest, UpdatePayload};
use crate::state::ApiState;

pub(crate) async fn list_languages(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiEnvelope<Vec<LanguageSummary>>>, ApiError> {
    let languages = state
        .catalog
        .languages()
        .await
        .map_err(|err| ApiError::from_catalog(err, "*", CatalogAccess::Read))?;
    Ok(Json(ApiEnvelope::data(languages)))
}

pub(crate) async fn get_translations(
    State(state): State<Arc<ApiState>>,
    Path(lang): Path<String>,
) -> Result<Json<ApiEnvelope<Vec<TranslationEntry>>>, ApiError> {
    let entries = state
        .catalog
        .translations(&lang)
        .await
        .map_err(|err| ApiError::from_catalog(err, &lang, CatalogAccess::Read))?;
    Ok(Json(ApiEnvelope::data(entries)))
}

pub(crate) async fn put_translations(
    State(state): State<Arc<ApiState>>,
    Path(lang): Path<String>,
    body: Bytes,
) -> Result<Json<ApiEnvelope<UpdateReport>>, ApiError> {
    let updates = decode_body::<UpdatePayload>(&body)?.into_updates();
    let requested = updates.len();
    let report = state
        .catalog
        .update_translations(&lang, updates)
        .await
        .map_err(|err| ApiError::from_catalog(err, &lang, CatalogAccess::Write))?;
    info!(
        lang = %lang,
        requested,
        applied = report.applied,
        ignored = report.ignored,
        "translations updated"
    );
    Ok(Json(ApiEnvelope::acknowledged(
        report,
        MESSAGE_TRANSLATIONS_UPDATED,
    )))
}

pub(crate) async fn put_translation(
    State(state): State<Arc<ApiState>>,
    Path((lang, msgid)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ApiEnvelope<UpdateReport>>, ApiError> {
    let request: SingleUpdateRequest = if body.is_empty() {
        SingleUpdateRequest::default()
    } else {
        decode_body(&body)?
    };
    let Some(msgstr) = request.msgstr else {
        return Err(ApiError::bad_request("msgstr is required").with_invalid_params(vec![
            ProblemInvalidParam {
                pointer: "/msgstr".to_string(),
                message: "is required".to_string(),
            },
        ]));
    };
    let report = state
        .catalog
        .update_translation(&lang, &msgid, &msgstr, request.context)
        .await
        .map_err(|err| ApiError::from_catalog(err, &lang, CatalogAccess::Write))?;
    info!(lang = %lang, msgid = %msgid, applied = report.applied, "translation updated");
    Ok(Json(ApiEnvelope::acknowledged(
        report,
        MESSAGE_TRANSLATION_UPDATED,
    )))
}

pub(crate) async fn search(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiEnvelope<Vec<SearchHit>>>, ApiError> {
    let text = query.q.unwrap_or_default();
    let lang = query.lang.filter(|code| !code.is_empty());
    let hits = state
        .catalog
        .search(&text, lang.as_deref())
        .await
        .map_err(|err| {
            ApiError::from_catalog(err, lang.as_deref().unwrap_or("*"), CatalogAccess::Read)
        })?;
    debug!(query = %text, hits = hits.len(), "search completed");
    Ok(Json(ApiEnvelope::data(hits)))
}

pub(crate) async fn api_fallback() -> Response {
    (Extension(UnmatchedRoute), ApiError::not_found("Not found")).into_response()
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("invalid request body: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use lingo_catalog::{CatalogService, LanguageNames};
    use lingo_events::EventBus;
    use lingo_telemetry::Metrics;
    use lingo_test_support::CatalogFixture;
    use lingo_test_support::samples::{DE_MIXED, FR_HELLO_UNTRANSLATED};

    fn state(fixture: &CatalogFixture) -> anyhow::Result<Arc<ApiState>> {
        let events = EventBus::new();
        let metrics = Metrics::new()?;
        let service = CatalogService::new(
            fixture.path(),
            LanguageNames::builtin(),
            events.clone(),
            metrics.clone(),
        );
        Ok(Arc::new(ApiState::new(Arc::new(service), metrics, events)))
    }

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn languages_report_statistics() -> anyhow::Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("fr", FR_HELLO_UNTRANSLATED)])?;
        let Json(envelope) = list_languages(State(state(&fixture)?)).await.map_err(|err| {
            anyhow::anyhow!("unexpected status {}", status_of(err))
        })?;
        assert!(envelope.success);
        let languages = envelope.data.unwrap_or_default();
        assert_eq!(languages.len(), 1);
        assert_eq!(languages[0].name, "French");
        assert_eq!(languages[0].untranslated, 1);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_language_is_not_found_on_read_and_bad_request_on_write() -> anyhow::Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("fr", FR_HELLO_UNTRANSLATED)])?;
        let state = state(&fixture)?;

        let read = get_translations(State(Arc::clone(&state)), Path("ja".to_string())).await;
        assert!(matches!(read, Err(ref err) if err.status == StatusCode::NOT_FOUND));

        let write = put_translations(
            State(state),
            Path("ja".to_string()),
            Bytes::from_static(br#"{"msgid":"Hello","msgstr":"x"}"#),
        )
        .await;
        assert!(matches!(write, Err(ref err) if err.status == StatusCode::BAD_REQUEST));
        Ok(())
    }

    #[tokio::test]
    async fn bulk_update_accepts_object_or_array() -> anyhow::Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("de", DE_MIXED)])?;
        let state = state(&fixture)?;

        let Json(single) = put_translations(
            State(Arc::clone(&state)),
            Path("de".to_string()),
            Bytes::from_static(br#"{"msgid":"Hello","msgstr":"Servus"}"#),
        )
        .await
        .map_err(|err| anyhow::anyhow!("unexpected status {}", status_of(err)))?;
        assert_eq!(single.message.as_deref(), Some(MESSAGE_TRANSLATIONS_UPDATED));
        assert_eq!(single.data.map(|report| report.applied), Some(1));

        let Json(many) = put_translations(
            State(state),
            Path("de".to_string()),
            Bytes::from_static(
                br#"[{"msgid":"Open","context":"menu","msgstr":"Oeffnen"},{"msgid":"Missing","msgstr":"x"}]"#,
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!("unexpected status {}", status_of(err)))?;
        let report = many.data.unwrap_or_default();
        assert_eq!((report.applied, report.ignored), (1, 1));
        assert!(fixture.read("de")?.contains("msgstr \"Oeffnen\""));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() -> anyhow::Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("fr", FR_HELLO_UNTRANSLATED)])?;
        let state = state(&fixture)?;

        let garbage = put_translations(
            State(Arc::clone(&state)),
            Path("fr".to_string()),
            Bytes::from_static(b"{not json"),
        )
        .await;
        assert!(matches!(garbage, Err(ref err) if err.status == StatusCode::BAD_REQUEST));

        let empty_id = put_translations(
            State(Arc::clone(&state)),
            Path("fr".to_string()),
            Bytes::from_static(br#"{"msgid":"","msgstr":"x"}"#),
        )
        .await;
        assert!(matches!(empty_id, Err(ref err) if err.status == StatusCode::BAD_REQUEST));

        let missing_msgstr = put_translation(
            State(state),
            Path(("fr".to_string(), "Hello".to_string())),
            Bytes::from_static(br#"{"context":null}"#),
        )
        .await;
        assert!(matches!(missing_msgstr, Err(ref err) if err.status == StatusCode::BAD_REQUEST));
        assert_eq!(fixture.read("fr")?, FR_HELLO_UNTRANSLATED);
        Ok(())
    }

    #[tokio::test]
    async fn single_update_then_search() -> anyhow::Result<()> {
        let fixture = CatalogFixture::with_catalogs(&[("fr", FR_HELLO_UNTRANSLATED)])?;
        let state = state(&fixture)?;

        let Json(ack) = put_translation(
            State(Arc::clone(&state)),
            Path(("fr".to_string(), "Hello".to_string())),
            Bytes::from_static(br#"{"msgstr":"Bonjour"}"#),
        )
        .await
        .map_err(|err| anyhow::anyhow!("unexpected status {}", status_of(err)))?;
        assert_eq!(ack.message.as_deref(), Some(MESSAGE_TRANSLATION_UPDATED));

        let Json(found) = search(
            State(state),
            Query(SearchQuery {
                q: Some("bonj".to_string()),
                lang: None,
            }),
        )
        .await
        .map_err(|err| anyhow::anyhow!("unexpected status {}", status_of(err)))?;
        let hits = found.data.unwrap_or_default();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].language, "fr");
        assert_eq!(hits[0].target, "Bonjour");
        Ok(())
    }
}
