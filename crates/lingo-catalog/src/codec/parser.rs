//! Line-oriented `.po` reader.

use std::collections::HashSet;
use std::mem;
use std::str::Chars;

use super::document::{Comment, PoDocument, PoMessage};
use crate::error::{CatalogError, CatalogResult};
use crate::model::EntryKey;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Translation(usize),
}

impl PoDocument {
    /// Parse catalog bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] with the 1-based line and a constant
    /// reason when the bytes are not a well-formed catalog.
    pub fn parse(bytes: &[u8]) -> CatalogResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(|err| {
            let line = bytes[..err.valid_up_to()]
                .iter()
                .filter(|byte| **byte == b'\n')
                .count()
                + 1;
            CatalogError::parse(line, "invalid utf-8")
        })?;
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

        let mut parser = Parser::default();
        parser.document.crlf = text
            .find('\n')
            .is_some_and(|end| text[..end].ends_with('\r'));
        for (index, line) in text.lines().enumerate() {
            parser.line(index + 1, line)?;
        }
        parser.finish()
    }
}

#[derive(Default)]
struct Parser {
    document: PoDocument,
    pending: Vec<Comment>,
    pending_source: String,
    current: Option<PoMessage>,
    has_id: bool,
    last: Option<Field>,
    seen: HashSet<EntryKey>,
}

impl Parser {
    fn line(&mut self, number: usize, raw: &str) -> CatalogResult<()> {
        let line = raw.trim();
        // A bare `#~` separates obsolete records like a blank line.
        if line.is_empty() || line == "#~" {
            return self.close();
        }
        if let Some(rest) = line.strip_prefix("#~|") {
            self.comment(Comment::Previous(strip_space(rest).to_string()))?;
        } else if let Some(rest) = line.strip_prefix("#~") {
            self.statement(number, rest.trim_start(), true)?;
        } else if let Some(rest) = line.strip_prefix('#') {
            self.comment(parse_comment(rest))?;
        } else {
            self.statement(number, line, false)?;
        }

        let source = match self.current.as_mut() {
            Some(message) => message.source.get_or_insert_with(String::new),
            None => &mut self.pending_source,
        };
        source.push_str(raw);
        source.push('\n');
        Ok(())
    }

    fn comment(&mut self, comment: Comment) -> CatalogResult<()> {
        if self.current.is_some() {
            self.close()?;
        }
        self.pending.push(comment);
        Ok(())
    }

    fn statement(&mut self, number: usize, line: &str, obsolete: bool) -> CatalogResult<()> {
        if line.starts_with('"') {
            let value = parse_quoted(line, number)?;
            return self.append(number, &value);
        }

        let end = line
            .find(|ch: char| ch.is_whitespace() || ch == '"')
            .unwrap_or(line.len());
        let (keyword, rest) = line.split_at(end);
        let value = parse_quoted(rest.trim_start(), number)?;

        match keyword {
            "msgctxt" => {
                if self.current.is_some() {
                    self.close()?;
                }
                self.open(number, obsolete).context = Some(value);
                self.last = Some(Field::Context);
            }
            "msgid" => {
                if self.has_id {
                    self.close()?;
                }
                self.open(number, obsolete).id = value;
                self.has_id = true;
                self.last = Some(Field::Id);
            }
            "msgid_plural" => {
                let message = match (&mut self.current, self.last) {
                    (Some(message), Some(Field::Id)) => message,
                    _ => return Err(CatalogError::parse(number, "msgid_plural without msgid")),
                };
                message.id_plural = Some(value);
                self.last = Some(Field::IdPlural);
            }
            _ => {
                let index = translation_index(keyword, number)?;
                let message = match self.current.as_mut() {
                    Some(message) if self.has_id => message,
                    _ => return Err(CatalogError::parse(number, "msgstr without msgid")),
                };
                if index != message.translations.len() {
                    return Err(CatalogError::parse(number, "bad plural index"));
                }
                message.translations.push(value);
                self.last = Some(Field::Translation(index));
            }
        }
        Ok(())
    }

    fn open(&mut self, number: usize, obsolete: bool) -> &mut PoMessage {
        let pending = &mut self.pending;
        let pending_source = &mut self.pending_source;
        self.current.get_or_insert_with(|| PoMessage {
            comments: mem::take(pending),
            obsolete,
            line: number,
            source: Some(mem::take(pending_source)),
            ..PoMessage::default()
        })
    }

    fn append(&mut self, number: usize, value: &str) -> CatalogResult<()> {
        let (Some(message), Some(field)) = (self.current.as_mut(), self.last) else {
            return Err(CatalogError::parse(number, "continuation without field"));
        };
        let slot = match field {
            Field::Context => message.context.get_or_insert_with(String::new),
            Field::Id => &mut message.id,
            Field::IdPlural => message.id_plural.get_or_insert_with(String::new),
            Field::Translation(index) => match message.translations.get_mut(index) {
                Some(slot) => slot,
                None => return Err(CatalogError::parse(number, "continuation without field")),
            },
        };
        slot.push_str(value);
        Ok(())
    }

    fn close(&mut self) -> CatalogResult<()> {
        let Some(message) = self.current.take() else {
            return Ok(());
        };
        let has_id = mem::replace(&mut self.has_id, false);
        self.last = None;

        if !has_id {
            return Err(CatalogError::parse(message.line, "msgctxt without msgid"));
        }
        if message.translations.is_empty() {
            return Err(CatalogError::parse(message.line, "record without msgstr"));
        }
        if message.is_entry() && !self.seen.insert(message.key()) {
            return Err(CatalogError::parse(message.line, "duplicate entry"));
        }
        self.document.messages.push(message);
        Ok(())
    }

    fn finish(mut self) -> CatalogResult<PoDocument> {
        self.close()?;
        self.document.trailing_comments = self.pending;
        Ok(self.document)
    }
}

fn strip_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

fn parse_comment(rest: &str) -> Comment {
    match rest.chars().next() {
        Some('.') => Comment::Extracted(strip_space(&rest[1..]).to_string()),
        Some(':') => Comment::Reference(strip_space(&rest[1..]).to_string()),
        Some('|') => Comment::Previous(strip_space(&rest[1..]).to_string()),
        Some(',') => Comment::Flags(
            rest[1..]
                .split(',')
                .map(str::trim)
                .filter(|flag| !flag.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => Comment::Translator(strip_space(rest).to_string()),
    }
}

fn translation_index(keyword: &str, number: usize) -> CatalogResult<usize> {
    if keyword == "msgstr" {
        return Ok(0);
    }
    keyword
        .strip_prefix("msgstr[")
        .and_then(|rest| rest.strip_suffix(']'))
        .map(|index| {
            index
                .parse()
                .map_err(|_| CatalogError::parse(number, "bad plural index"))
        })
        .unwrap_or_else(|| Err(CatalogError::parse(number, "unknown keyword")))
}

fn parse_quoted(text: &str, number: usize) -> CatalogResult<String> {
    let mut chars = text.chars();
    if chars.next() != Some('"') {
        return Err(CatalogError::parse(number, "expected quoted string"));
    }

    // Numeric escapes name bytes, so the value is assembled as UTF-8 bytes.
    let mut value = Vec::with_capacity(text.len());
    loop {
        match chars.next() {
            None => return Err(CatalogError::parse(number, "unterminated string")),
            Some('"') => break,
            Some('\\') => match chars.next() {
                None => return Err(CatalogError::parse(number, "unterminated string")),
                Some(first @ '0'..='7') => {
                    let code = u32::from(first) - u32::from('0');
                    let byte = numeric_escape(&mut chars, 8, code, 2)
                        .ok_or_else(|| CatalogError::parse(number, "escape out of range"))?;
                    value.push(byte);
                }
                Some('x') if chars.clone().next().is_some_and(|ch| ch.is_ascii_hexdigit()) => {
                    let byte = numeric_escape(&mut chars, 16, 0, usize::MAX)
                        .ok_or_else(|| CatalogError::parse(number, "escape out of range"))?;
                    value.push(byte);
                }
                Some(escaped) => match unescape(escaped) {
                    Some(ch) => push_char(&mut value, ch),
                    None => {
                        push_char(&mut value, '\\');
                        push_char(&mut value, escaped);
                    }
                },
            },
            Some(ch) => push_char(&mut value, ch),
        }
    }

    if !chars.as_str().trim().is_empty() {
        return Err(CatalogError::parse(number, "trailing content after string"));
    }
    String::from_utf8(value).map_err(|_| CatalogError::parse(number, "invalid utf-8"))
}

fn push_char(value: &mut Vec<u8>, ch: char) {
    value.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
}

/// Consume up to `max_digits` further digits of a numeric escape.
fn numeric_escape(chars: &mut Chars<'_>, radix: u32, mut code: u32, max_digits: usize) -> Option<u8> {
    for _ in 0..max_digits {
        let Some(digit) = chars.clone().next().and_then(|ch| ch.to_digit(radix)) else {
            break;
        };
        chars.next();
        code = code.checked_mul(radix)?.checked_add(digit)?;
    }
    u8::try_from(code).ok()
}

const fn unescape(ch: char) -> Option<char> {
    Some(match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '\\' => '\\',
        '"' => '"',
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'v' => '\u{b}',
        _ => return None,
    })
}
