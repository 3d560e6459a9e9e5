//! In-memory `.po` document.
//!
//! The document keeps everything needed to write the file back: the header
//! record, comment lines in their original order, obsolete records, plural
//! slots and trailing comments. Only [`PoDocument::entries`] narrows it down to
//! the entry set exposed to callers.

use crate::model::{Annotations, EntryKey, FUZZY_FLAG, TranslationEntry, TranslationUpdate};

/// One comment line attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment {
    /// `# text`
    Translator(String),
    /// `#. text`
    Extracted(String),
    /// `#: text`
    Reference(String),
    /// `#, flag, flag`
    Flags(Vec<String>),
    /// `#| text`
    Previous(String),
}

impl Comment {
    const fn sort_rank(&self) -> u8 {
        match self {
            Self::Translator(_) => 0,
            Self::Extracted(_) => 1,
            Self::Reference(_) => 2,
            Self::Flags(_) => 3,
            Self::Previous(_) => 4,
        }
    }
}

/// One record of the catalog: header, entry or obsolete entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoMessage {
    /// Comment lines in file order.
    pub comments: Vec<Comment>,
    /// Record was commented out with `#~`.
    pub obsolete: bool,
    /// `msgctxt` value.
    pub context: Option<String>,
    /// `msgid` value.
    pub id: String,
    /// `msgid_plural` value.
    pub id_plural: Option<String>,
    /// `msgstr` or `msgstr[N]` values, indexed by plural slot.
    pub translations: Vec<String>,
    /// 1-based line on which the record starts.
    pub line: usize,
    /// Lines the record was parsed from, written back as-is until the record
    /// is edited.
    pub source: Option<String>,
}

impl PoMessage {
    /// Header records carry file metadata under an empty identifier.
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.id.is_empty() && !self.obsolete
    }

    /// Live, non-header records form the entry set.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        !self.id.is_empty() && !self.obsolete
    }

    /// Key of this record with an empty context folded into `None`.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.id.clone(), self.context.clone())
    }

    fn matches(&self, key: &EntryKey) -> bool {
        self.id == key.identifier
            && self.context.as_deref().filter(|ctx| !ctx.is_empty()) == key.context.as_deref()
    }

    /// First translation slot, empty when absent.
    #[must_use]
    pub fn target(&self) -> &str {
        self.translations.first().map_or("", String::as_str)
    }

    /// Every flag token across `#,` lines.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.comments
            .iter()
            .filter_map(|comment| match comment {
                Comment::Flags(flags) => Some(flags),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    /// Flag tokens joined with `, `, `None` when there are none.
    #[must_use]
    pub fn flag_string(&self) -> Option<String> {
        let flags: Vec<&str> = self.flags().collect();
        (!flags.is_empty()).then(|| flags.join(", "))
    }

    /// Fuzzy by substring containment on the flag string.
    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.flag_string()
            .is_some_and(|flags| flags.contains(FUZZY_FLAG))
    }

    fn set_target(&mut self, target: &str) {
        match self.translations.first_mut() {
            Some(slot) => target.clone_into(slot),
            None => self.translations.push(target.to_string()),
        }
    }

    fn set_fuzzy(&mut self, fuzzy: bool) {
        if fuzzy {
            if self.is_fuzzy() {
                return;
            }
            let existing = self.comments.iter_mut().find_map(|comment| match comment {
                Comment::Flags(flags) => Some(flags),
                _ => None,
            });
            if let Some(flags) = existing {
                flags.insert(0, FUZZY_FLAG.to_string());
            } else {
                let flags = Comment::Flags(vec![FUZZY_FLAG.to_string()]);
                let position = self
                    .comments
                    .iter()
                    .position(|comment| comment.sort_rank() > flags.sort_rank())
                    .unwrap_or(self.comments.len());
                self.comments.insert(position, flags);
            }
        } else {
            for comment in &mut self.comments {
                if let Comment::Flags(flags) = comment {
                    flags.retain(|flag| !flag.contains(FUZZY_FLAG));
                }
            }
            self.comments
                .retain(|comment| !matches!(comment, Comment::Flags(flags) if flags.is_empty()));
        }
    }

    fn annotations(&self) -> Option<Annotations> {
        let joined = |pick: fn(&Comment) -> Option<&str>| {
            let lines: Vec<&str> = self.comments.iter().filter_map(pick).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        };
        let annotations = Annotations {
            reference: joined(|comment| match comment {
                Comment::Reference(text) => Some(text.as_str()),
                _ => None,
            }),
            translator: joined(|comment| match comment {
                Comment::Translator(text) => Some(text.as_str()),
                _ => None,
            }),
            extracted: joined(|comment| match comment {
                Comment::Extracted(text) => Some(text.as_str()),
                _ => None,
            }),
            flag: self.flag_string(),
            previous: joined(|comment| match comment {
                Comment::Previous(text) => Some(text.as_str()),
                _ => None,
            }),
        };
        (!annotations.is_empty()).then_some(annotations)
    }

    /// Project the record onto the consumer-facing entry shape.
    #[must_use]
    pub fn to_entry(&self) -> TranslationEntry {
        TranslationEntry {
            identifier: self.id.clone(),
            target: self.target().to_string(),
            context: self.context.clone().filter(|ctx| !ctx.is_empty()),
            annotations: self.annotations(),
            fuzzy: self.is_fuzzy(),
        }
    }
}

/// Parsed catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoDocument {
    /// Records in file order, header included.
    pub messages: Vec<PoMessage>,
    /// Comment lines after the last record.
    pub trailing_comments: Vec<Comment>,
    /// The file used `\r\n` line endings.
    pub crlf: bool,
}

impl PoDocument {
    /// The header record, if the file has one.
    #[must_use]
    pub fn header(&self) -> Option<&PoMessage> {
        self.messages.iter().find(|message| message.is_header())
    }

    /// Entry set in file order, header and obsolete records excluded.
    #[must_use]
    pub fn entries(&self) -> Vec<TranslationEntry> {
        self.messages
            .iter()
            .filter(|message| message.is_entry())
            .map(PoMessage::to_entry)
            .collect()
    }

    /// Apply one update; returns `false` when no live entry matches its key.
    pub fn apply(&mut self, update: &TranslationUpdate) -> bool {
        let key = update.key();
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|message| message.is_entry() && message.matches(&key))
        else {
            return false;
        };
        message.source = None;
        if let Some(target) = update.target.as_deref() {
            message.set_target(target);
        }
        if let Some(fuzzy) = update.fuzzy {
            message.set_fuzzy(fuzzy);
        }
        true
    }
}
