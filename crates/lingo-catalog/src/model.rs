//! Catalog data model shared by the engine and the HTTP surface.
//!
//! Field names on the wire follow the gettext vocabulary used by the editor
//! UI (`msgid`, `msgstr`, `comments`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Flag token marking an entry as needing review.
pub const FUZZY_FLAG: &str = "fuzzy";

/// One translatable entry of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Source-language string; unique within its context.
    #[serde(rename = "msgid")]
    pub identifier: String,
    /// Translated string, empty when untranslated.
    #[serde(rename = "msgstr")]
    pub target: String,
    /// Disambiguating context, `None` for entries without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Comment block attached to the entry.
    #[serde(rename = "comments", default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    /// Whether the flag annotation contains the fuzzy marker.
    pub fuzzy: bool,
}

impl TranslationEntry {
    /// Key addressing this entry inside its catalog.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.identifier.clone(), self.context.clone())
    }

    /// Translated means a non-empty target that is not awaiting review.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        !self.target.is_empty() && !self.fuzzy
    }
}

/// Comment block of an entry. Multiple comment lines of one kind are joined
/// with `\n`; flags are joined with `, `.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    /// Source references (`#:`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Translator comments (`# `).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<String>,
    /// Extracted developer comments (`#.`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<String>,
    /// Flags (`#,`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    /// Previous source strings (`#|`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl Annotations {
    /// True when no comment kind is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reference.is_none()
            && self.translator.is_none()
            && self.extracted.is_none()
            && self.flag.is_none()
            && self.previous.is_none()
    }
}

/// Address of an entry: identifier plus optional context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    /// Source-language string.
    #[serde(rename = "msgid")]
    pub identifier: String,
    /// Context, `None` when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl EntryKey {
    /// Build a key, folding an empty context into `None`.
    #[must_use]
    pub fn new(identifier: impl Into<String>, context: Option<String>) -> Self {
        Self {
            identifier: identifier.into(),
            context: context.filter(|value| !value.is_empty()),
        }
    }
}

/// Derived per-catalog counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Number of entries.
    pub total: usize,
    /// Entries with a non-empty, non-fuzzy target.
    pub translated: usize,
    /// Entries flagged fuzzy.
    pub fuzzy: usize,
    /// `total - translated - fuzzy`.
    pub untranslated: usize,
}

impl Progress {
    /// Count entries by state.
    #[must_use]
    pub fn from_entries(entries: &[TranslationEntry]) -> Self {
        let total = entries.len();
        let translated = entries.iter().filter(|entry| entry.is_translated()).count();
        let fuzzy = entries.iter().filter(|entry| entry.fuzzy).count();
        Self {
            total,
            translated,
            fuzzy,
            untranslated: total.saturating_sub(translated).saturating_sub(fuzzy),
        }
    }

    /// `round(translated / total * 100)`, halves rounding up; 0 for an empty catalog.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let rounded = (self.translated * 200 + self.total) / (self.total * 2);
        u8::try_from(rounded).unwrap_or(100)
    }
}

/// One language catalog as loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCatalog {
    /// Language code derived from the file stem.
    pub code: String,
    /// Human-readable language name.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Path of the backing file.
    pub path: PathBuf,
    /// Entries in file order.
    #[serde(rename = "translations")]
    pub entries: Vec<TranslationEntry>,
    /// Derived counters.
    pub progress: Progress,
}

/// Statistics row for the language overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSummary {
    /// Language code.
    pub code: String,
    /// Human-readable language name.
    pub name: String,
    /// Number of entries.
    pub total: usize,
    /// Entries with a non-empty, non-fuzzy target.
    pub translated: usize,
    /// Entries flagged fuzzy.
    pub fuzzy: usize,
    /// Entries neither translated nor fuzzy.
    pub untranslated: usize,
    /// Rounded translated percentage.
    pub progress: u8,
}

impl From<&LanguageCatalog> for LanguageSummary {
    fn from(catalog: &LanguageCatalog) -> Self {
        Self {
            code: catalog.code.clone(),
            name: catalog.display_name.clone(),
            total: catalog.progress.total,
            translated: catalog.progress.translated,
            fuzzy: catalog.progress.fuzzy,
            untranslated: catalog.progress.untranslated,
            progress: catalog.progress.percent(),
        }
    }
}

/// A targeted change to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUpdate {
    /// Identifier of the entry to patch.
    #[serde(rename = "msgid", alias = "identifier")]
    pub identifier: String,
    /// New target; `None` keeps the current one.
    #[serde(
        rename = "msgstr",
        alias = "target",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<String>,
    /// Context of the entry to patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Set (`true`) or clear (`false`) the fuzzy flag; `None` leaves it alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,
}

impl TranslationUpdate {
    /// Update replacing the target of an entry without context.
    #[must_use]
    pub fn target(identifier: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            target: Some(target.into()),
            context: None,
            fuzzy: None,
        }
    }

    /// Update toggling only the fuzzy flag.
    #[must_use]
    pub fn fuzzy(identifier: impl Into<String>, fuzzy: bool) -> Self {
        Self {
            identifier: identifier.into(),
            target: None,
            context: None,
            fuzzy: Some(fuzzy),
        }
    }

    /// Address the entry within `context`.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Also set or clear the fuzzy flag.
    #[must_use]
    pub const fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    /// Key of the entry this update addresses.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.identifier.clone(), self.context.clone())
    }
}

/// Outcome of applying a batch of updates to one catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Updates that matched an entry.
    pub applied: usize,
    /// Updates whose entry does not exist in the catalog.
    pub ignored: usize,
    /// Keys of the ignored updates, in request order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_entries: Vec<EntryKey>,
}

/// One search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Language code of the matching catalog.
    #[serde(rename = "lang")]
    pub language: String,
    /// Identifier of the matching entry.
    #[serde(rename = "msgid")]
    pub identifier: String,
    /// Target of the matching entry.
    #[serde(rename = "msgstr")]
    pub target: String,
    /// Context of the matching entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(target: &str, fuzzy: bool) -> TranslationEntry {
        TranslationEntry {
            identifier: format!("id-{target}-{fuzzy}"),
            target: target.to_string(),
            context: None,
            annotations: None,
            fuzzy,
        }
    }

    #[test]
    fn progress_counts_sum_to_total() {
        let entries = vec![
            entry("Bonjour", false),
            entry("", false),
            entry("Salut", true),
            entry("", true),
        ];
        let progress = Progress::from_entries(&entries);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.translated, 1);
        assert_eq!(progress.fuzzy, 2);
        assert_eq!(progress.untranslated, 1);
        assert_eq!(
            progress.translated + progress.fuzzy + progress.untranslated,
            progress.total
        );
        assert_eq!(progress.percent(), 25);
    }

    #[test]
    fn percent_rounds_half_up_and_guards_empty() {
        let make = |translated, total| Progress {
            total,
            translated,
            fuzzy: 0,
            untranslated: total - translated,
        };
        assert_eq!(Progress::default().percent(), 0);
        assert_eq!(make(1, 3).percent(), 33);
        assert_eq!(make(2, 3).percent(), 67);
        assert_eq!(make(1, 8).percent(), 13);
        assert_eq!(make(1, 200).percent(), 1);
        assert_eq!(make(1, 201).percent(), 0);
        assert_eq!(make(5, 5).percent(), 100);
    }

    #[test]
    fn entry_key_folds_empty_context() {
        assert_eq!(
            EntryKey::new("Hello", Some(String::new())),
            EntryKey::new("Hello", None)
        );
    }

    #[test]
    fn update_accepts_wire_and_descriptive_field_names() -> anyhow::Result<()> {
        let wire: TranslationUpdate =
            serde_json::from_str(r#"{"msgid":"Hello","msgstr":"Bonjour","fuzzy":false}"#)?;
        let descriptive: TranslationUpdate =
            serde_json::from_str(r#"{"identifier":"Hello","target":"Bonjour","fuzzy":false}"#)?;
        assert_eq!(wire, descriptive);
        assert_eq!(wire, TranslationUpdate::target("Hello", "Bonjour").with_fuzzy(false));

        let toggle: TranslationUpdate = serde_json::from_str(r#"{"msgid":"Hello","fuzzy":true}"#)?;
        assert_eq!(toggle, TranslationUpdate::fuzzy("Hello", true));
        Ok(())
    }

    #[test]
    fn entry_serializes_with_gettext_names() -> anyhow::Result<()> {
        let value = serde_json::to_value(TranslationEntry {
            identifier: "Hello".into(),
            target: "Bonjour".into(),
            context: Some("greeting".into()),
            annotations: Some(Annotations {
                reference: Some("src/app.rs:10".into()),
                ..Annotations::default()
            }),
            fuzzy: false,
        })?;
        assert_eq!(value["msgid"], "Hello");
        assert_eq!(value["msgstr"], "Bonjour");
        assert_eq!(value["context"], "greeting");
        assert_eq!(value["comments"]["reference"], "src/app.rs:10");
        assert_eq!(value["fuzzy"], false);
        Ok(())
    }
}
