//! Shared HTTP constants (headers, problem URIs, streaming defaults).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_LAST_EVENT_ID: &str = "last-event-id";
pub(crate) const SSE_KEEP_ALIVE_SECS: u64 = 20;

pub(crate) const PROBLEM_INTERNAL: &str = "https://lingo-translations.github.io/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str =
    "https://lingo-translations.github.io/problems/bad-request";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://lingo-translations.github.io/problems/not-found";
pub(crate) const PROBLEM_CATALOG_INVALID: &str =
    "https://lingo-translations.github.io/problems/catalog-invalid";

pub(crate) const MESSAGE_TRANSLATIONS_UPDATED: &str = "Translations updated";
pub(crate) const MESSAGE_TRANSLATION_UPDATED: &str = "Translation updated";
