#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! HTTP surface for the translation catalog engine.
//!
//! Layout: `catalog.rs` (engine facade trait), `state.rs` (shared handler
//! state), `models.rs` (envelopes and request bodies), `error.rs` (server
//! bootstrap errors), `http/` (router, handlers, SSE, health, middleware).

pub mod catalog;
pub mod error;
pub mod http;
pub mod models;
pub mod state;

pub use catalog::{CatalogFacade, SharedCatalog};
pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;
