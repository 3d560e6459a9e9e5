//! Language code to display-name lookup.

use std::collections::HashMap;

/// Built-in display names, keyed by language code.
pub const BUILTIN_LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("pt-BR", "Portuguese (Brazil)"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
    ("ru", "Russian"),
    ("ar", "Arabic"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("no", "Norwegian"),
    ("tr", "Turkish"),
    ("cs", "Czech"),
    ("hu", "Hungarian"),
    ("ro", "Romanian"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("ms", "Malay"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
];

/// Display-name table: built-in names plus configured overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageNames {
    names: HashMap<String, String>,
}

impl Default for LanguageNames {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageNames {
    /// Table holding only the built-in names.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_overrides(std::iter::empty::<(String, String)>())
    }

    /// Built-in names with `overrides` layered on top; later pairs win.
    #[must_use]
    pub fn with_overrides<I, C, N>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut names: HashMap<String, String> = BUILTIN_LANGUAGE_NAMES
            .iter()
            .map(|(code, name)| ((*code).to_string(), (*name).to_string()))
            .collect();
        names.extend(
            overrides
                .into_iter()
                .map(|(code, name)| (code.into(), name.into())),
        );
        Self { names }
    }

    /// Name for `code`, or the uppercased code when the table has no entry.
    #[must_use]
    pub fn display_name(&self, code: &str) -> String {
        self.names
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_uppercase())
    }
}
