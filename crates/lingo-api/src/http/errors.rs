//! RFC9457-style API error wrapper.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lingo_catalog::CatalogError;
use tracing::error;

use crate::http::constants::{
    PROBLEM_BAD_REQUEST, PROBLEM_CATALOG_INVALID, PROBLEM_INTERNAL, PROBLEM_NOT_FOUND,
};
use crate::models::{ProblemDetails, ProblemInvalidParam};

/// How the failing request touched the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CatalogAccess {
    Read,
    Write,
}

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    pub(crate) invalid_params: Option<Vec<ProblemInvalidParam>>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            invalid_params: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn with_invalid_params(mut self, params: Vec<ProblemInvalidParam>) -> Self {
        self.invalid_params = Some(params);
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            PROBLEM_NOT_FOUND,
            "resource not found",
        )
        .with_detail(detail)
    }

    pub(crate) fn catalog_invalid(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_CATALOG_INVALID,
            "catalog invalid",
        )
        .with_detail(detail)
    }

    /// Map an engine failure for the language `lang`.
    pub(crate) fn from_catalog(err: CatalogError, lang: &str, access: CatalogAccess) -> Self {
        match err {
            CatalogError::NotFound { .. } => {
                let detail = format!("Language not found: {lang}");
                match access {
                    CatalogAccess::Read => Self::not_found(detail),
                    CatalogAccess::Write => Self::bad_request(detail),
                }
            }
            CatalogError::InvalidInput { field, reason, .. } => {
                Self::bad_request(format!("{field} {reason}")).with_invalid_params(vec![
                    ProblemInvalidParam {
                        pointer: format!("/{field}"),
                        message: reason.to_string(),
                    },
                ])
            }
            CatalogError::Parse {
                ref path,
                line,
                reason,
            } => {
                error!(path = ?path, line, reason, lang, "catalog decode failed");
                Self::catalog_invalid(format!("{reason} at line {line}"))
            }
            other => {
                error!(error = %other, error_debug = ?other, lang, "catalog operation failed");
                Self::internal(other.to_string())
            }
        }
    }

    fn message(&self) -> String {
        self.detail
            .clone()
            .unwrap_or_else(|| self.title.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            success: false,
            error: self.message(),
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            invalid_params: self.invalid_params,
        };
        (self.status, Json(body)).into_response()
    }
}
