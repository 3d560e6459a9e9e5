//! HTTP surface modules (router, handlers, streaming, middleware).

/// Catalog handlers under the API prefix.
pub mod catalog;
/// Shared constants and header names for HTTP surfaces.
pub mod constants;
/// Problem response helpers and error types.
pub mod errors;
/// Health and metrics endpoints.
pub mod health;
/// Router construction and server host.
pub mod router;
/// Server-sent catalog events.
pub mod sse;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
