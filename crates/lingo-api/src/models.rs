//! Response envelopes and request bodies of the translation API.
//!
//! Every response carries a `success` flag. Successful responses put their
//! payload under `data` and may add a `message`; failures are RFC 9457 problem
//! documents that also carry `success: false` and a human-readable `error`.

use lingo_catalog::TranslationUpdate;
use serde::{Deserialize, Serialize};

/// Successful response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiEnvelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Response payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Envelope carrying `data`.
    pub const fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Envelope carrying `data` and an acknowledgement message.
    pub fn acknowledged(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    /// Always `false`.
    pub success: bool,
    /// Human-readable failure message.
    pub error: String,
    /// Problem type URI.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short summary of the problem type.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Occurrence-specific explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Request fields that failed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// Invalid parameter pointer surfaced alongside a [`ProblemDetails`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemInvalidParam {
    /// JSON pointer to the offending field.
    pub pointer: String,
    /// Why the field was rejected.
    pub message: String,
}

/// Body of a bulk update: a single update or an array of them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UpdatePayload {
    /// Array form.
    Many(Vec<TranslationUpdate>),
    /// Single-object form.
    One(TranslationUpdate),
}

impl UpdatePayload {
    /// Flatten into the update list.
    #[must_use]
    pub fn into_updates(self) -> Vec<TranslationUpdate> {
        match self {
            Self::Many(updates) => updates,
            Self::One(update) => vec![update],
        }
    }
}

/// Body of a single-entry update; the identifier comes from the path.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SingleUpdateRequest {
    /// New target.
    #[serde(default, alias = "target")]
    pub msgstr: Option<String>,
    /// Context of the entry.
    #[serde(default)]
    pub context: Option<String>,
}

/// Query string of the search endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    /// Text to look for; absent means match everything.
    #[serde(default)]
    pub q: Option<String>,
    /// Restrict the search to one language.
    #[serde(default)]
    pub lang: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_payload_accepts_object_and_array() -> anyhow::Result<()> {
        let one: UpdatePayload =
            serde_json::from_value(json!({"msgid": "Hello", "msgstr": "Bonjour"}))?;
        assert_eq!(
            one.into_updates(),
            vec![TranslationUpdate::target("Hello", "Bonjour")]
        );

        let many: UpdatePayload = serde_json::from_value(json!([
            {"msgid": "Hello", "msgstr": "Bonjour"},
            {"msgid": "Bye", "fuzzy": true, "context": "menu"}
        ]))?;
        assert_eq!(
            many.into_updates(),
            vec![
                TranslationUpdate::target("Hello", "Bonjour"),
                TranslationUpdate::fuzzy("Bye", true).with_context("menu"),
            ]
        );

        assert!(serde_json::from_value::<UpdatePayload>(json!({"msgstr": "x"})).is_err());
        Ok(())
    }

    #[test]
    fn envelopes_omit_absent_fields() -> anyhow::Result<()> {
        let value = serde_json::to_value(ApiEnvelope::data(vec![1, 2]))?;
        assert_eq!(value, json!({"success": true, "data": [1, 2]}));

        let ack = serde_json::to_value(ApiEnvelope::acknowledged(3, "Translation updated"))?;
        assert_eq!(
            ack,
            json!({"success": true, "data": 3, "message": "Translation updated"})
        );
        Ok(())
    }
}
