//! Gettext `.po` codec.
//!
//! # Design
//!
//! - Decoding builds a full [`PoDocument`]; the entry set is a projection of it.
//! - Encoding is decode, merge, re-serialize. Records a patch does not touch
//!   keep their source lines and are written back byte for byte.
//! - The line ending of the input (`\n` or `\r\n`) is kept on output.
//! - Serialization is deterministic: encoding the output of an encode is a no-op.

pub mod document;
mod parser;
mod writer;

pub use document::{Comment, PoDocument, PoMessage};

use crate::error::CatalogResult;
use crate::model::{TranslationEntry, TranslationUpdate, UpdateReport};

/// Result of merging a patch set into catalog bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Serialized catalog.
    pub bytes: Vec<u8>,
    /// Which patches matched.
    pub report: UpdateReport,
}

/// Decode catalog bytes into the consumer-facing entry set.
///
/// # Errors
///
/// Returns [`crate::CatalogError::Parse`] when the bytes are not a well-formed catalog.
pub fn decode(bytes: &[u8]) -> CatalogResult<Vec<TranslationEntry>> {
    Ok(PoDocument::parse(bytes)?.entries())
}

/// Merge `updates` into `existing` and serialize the result.
///
/// Updates addressing an entry that does not exist are ignored and listed in
/// the report.
///
/// # Errors
///
/// Returns [`crate::CatalogError::Parse`] when `existing` is not a well-formed catalog.
pub fn encode(existing: &[u8], updates: &[TranslationUpdate]) -> CatalogResult<Encoded> {
    let mut document = PoDocument::parse(existing)?;
    let mut report = UpdateReport::default();
    for update in updates {
        if document.apply(update) {
            report.applied += 1;
        } else {
            report.ignored += 1;
            report.ignored_entries.push(update.key());
        }
    }
    Ok(Encoded {
        bytes: document.to_po_string().into_bytes(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryKey;

    const CATALOG: &[u8] = b"msgid \"\"\n\
msgstr \"Language: fr\\n\"\n\
\n\
#: src/app.rs:1\n\
msgid \"Hello\"\n\
msgstr \"\"\n\
\n\
#, c-format\n\
msgid \"Bye %s\"\n\
msgstr \"Salut %s\"\n";

    #[test]
    fn decode_skips_the_header() -> anyhow::Result<()> {
        let entries = decode(CATALOG)?;
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| !entry.identifier.is_empty()));
        Ok(())
    }

    #[test]
    fn empty_patch_set_round_trips() -> anyhow::Result<()> {
        let encoded = encode(CATALOG, &[])?;
        assert_eq!(decode(&encoded.bytes)?, decode(CATALOG)?);
        assert_eq!(encoded.report, UpdateReport::default());
        Ok(())
    }

    #[test]
    fn patches_touch_only_their_entry() -> anyhow::Result<()> {
        let encoded = encode(
            CATALOG,
            &[TranslationUpdate::target("Hello", "Bonjour").with_fuzzy(true)],
        )?;
        let before = decode(CATALOG)?;
        let after = decode(&encoded.bytes)?;

        assert_eq!(after[0].target, "Bonjour");
        assert!(after[0].fuzzy);
        assert_eq!(
            after[0].annotations.as_ref().and_then(|a| a.reference.as_deref()),
            Some("src/app.rs:1")
        );
        assert_eq!(after[1], before[1]);
        Ok(())
    }

    #[test]
    fn unmatched_patches_are_counted_not_created() -> anyhow::Result<()> {
        let encoded = encode(
            CATALOG,
            &[
                TranslationUpdate::target("Missing", "x"),
                TranslationUpdate::target("Hello", "Salut").with_context("menu"),
                TranslationUpdate::fuzzy("Hello", true),
            ],
        )?;
        assert_eq!(encoded.report.applied, 1);
        assert_eq!(encoded.report.ignored, 2);
        assert_eq!(
            encoded.report.ignored_entries,
            vec![
                EntryKey::new("Missing", None),
                EntryKey::new("Hello", Some("menu".into())),
            ]
        );
        assert_eq!(decode(&encoded.bytes)?.len(), 2);
        Ok(())
    }

    #[test]
    fn reapplying_an_update_is_idempotent() -> anyhow::Result<()> {
        let update = [TranslationUpdate::target("Bye %s", "Au revoir %s").with_fuzzy(false)];
        let once = encode(CATALOG, &update)?;
        let twice = encode(&once.bytes, &update)?;
        assert_eq!(once.bytes, twice.bytes);
        assert_eq!(
            decode(&once.bytes)?[1]
                .annotations
                .as_ref()
                .and_then(|a| a.flag.as_deref()),
            Some("c-format")
        );
        Ok(())
    }

    #[test]
    fn untouched_neighbours_keep_their_bytes() -> anyhow::Result<()> {
        let existing = b"msgid \"A\"\nmsgstr \"\\101\\x42\"\n\nmsgid \"B\"\nmsgstr \"\"\n";
        let encoded = encode(existing, &[TranslationUpdate::target("B", "b")])?;
        let text = String::from_utf8(encoded.bytes.clone())?;
        assert!(text.starts_with("msgid \"A\"\nmsgstr \"\\101\\x42\"\n\n"));

        let entries = decode(&encoded.bytes)?;
        assert_eq!(entries[0].target, "AB");
        assert_eq!(entries[1].target, "b");
        Ok(())
    }

    #[test]
    fn crlf_catalogs_stay_crlf() -> anyhow::Result<()> {
        let existing = CATALOG
            .split(|byte| *byte == b'\n')
            .collect::<Vec<_>>()
            .join(&b"\r\n"[..]);
        let encoded = encode(&existing, &[TranslationUpdate::target("Hello", "Bonjour")])?;
        let text = String::from_utf8(encoded.bytes.clone())?;
        assert!(text.contains("msgstr \"Bonjour\"\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
        assert_eq!(decode(&encoded.bytes)?[0].target, "Bonjour");
        Ok(())
    }

    #[test]
    fn malformed_bytes_fail_to_encode() {
        assert!(encode(b"msgid \"broken\n", &[]).is_err());
    }
}
