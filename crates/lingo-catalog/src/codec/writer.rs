//! Deterministic `.po` serializer.

use std::fmt::Write as _;

use super::document::{Comment, PoDocument, PoMessage};

impl PoDocument {
    /// Serialize the document in gettext layout.
    ///
    /// Records are separated by one blank line and the output ends with a
    /// newline unless the document is empty. Records that still carry their
    /// source lines are written verbatim; the rest are laid out canonically.
    #[must_use]
    pub fn to_po_string(&self) -> String {
        let mut out = String::new();
        for (index, message) in self.messages.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            write_message(&mut out, message);
        }
        if !self.trailing_comments.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            for comment in &self.trailing_comments {
                write_comment(&mut out, comment, false);
            }
        }
        if self.crlf {
            out = out.replace('\n', "\r\n");
        }
        out
    }
}

fn write_message(out: &mut String, message: &PoMessage) {
    if let Some(source) = &message.source {
        out.push_str(source);
        return;
    }
    for comment in &message.comments {
        write_comment(out, comment, message.obsolete);
    }

    let prefix = if message.obsolete { "#~ " } else { "" };
    if let Some(context) = &message.context {
        write_field(out, prefix, "msgctxt", context);
    }
    write_field(out, prefix, "msgid", &message.id);
    if let Some(plural) = &message.id_plural {
        write_field(out, prefix, "msgid_plural", plural);
    }

    let indexed = message.id_plural.is_some() || message.translations.len() > 1;
    for (slot, translation) in message.translations.iter().enumerate() {
        if indexed {
            write_field(out, prefix, &format!("msgstr[{slot}]"), translation);
        } else {
            write_field(out, prefix, "msgstr", translation);
        }
    }
}

fn write_comment(out: &mut String, comment: &Comment, obsolete: bool) {
    let (marker, text) = match comment {
        Comment::Translator(text) if text.is_empty() => {
            out.push_str("#\n");
            return;
        }
        Comment::Translator(text) => ("#", text.as_str()),
        Comment::Extracted(text) => ("#.", text.as_str()),
        Comment::Reference(text) => ("#:", text.as_str()),
        Comment::Previous(text) if obsolete => ("#~|", text.as_str()),
        Comment::Previous(text) => ("#|", text.as_str()),
        Comment::Flags(flags) if flags.is_empty() => return,
        Comment::Flags(flags) => {
            let _ = writeln!(out, "#, {}", flags.join(", "));
            return;
        }
    };
    let _ = writeln!(out, "{marker} {text}");
}

fn write_field(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let segments: Vec<&str> = value.split_inclusive('\n').collect();
    if segments.len() > 1 {
        let _ = writeln!(out, "{prefix}{keyword} \"\"");
        for segment in segments {
            let _ = writeln!(out, "{prefix}\"{}\"", escape(segment));
        }
    } else {
        let _ = writeln!(out, "{prefix}{keyword} \"{}\"", escape(value));
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\000"),
            '\u{7}' => escaped.push_str("\\a"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            '\u{b}' => escaped.push_str("\\v"),
            other => escaped.push(other),
        }
    }
    escaped
}
