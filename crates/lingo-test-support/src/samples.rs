//! Catalog texts used by tests across the workspace.

/// French catalog holding the single untranslated `Hello` entry.
pub const FR_HELLO_UNTRANSLATED: &str = "msgid \"\"
msgstr \"\"
\"Language: fr\\n\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

msgid \"Hello\"
msgstr \"\"
";

/// German catalog covering every entry state, comment kind and a plural record.
pub const DE_MIXED: &str = "# German translations
msgid \"\"
msgstr \"\"
\"Language: de\\n\"
\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"

#. Shown on the landing page
#: src/app.rs:12
msgid \"Hello\"
msgstr \"Hallo\"

#: src/app.rs:20
#, fuzzy, c-format
msgid \"Goodbye %s\"
msgstr \"Tschüss %s\"

msgctxt \"menu\"
msgid \"Open\"
msgstr \"\"

msgctxt \"verb\"
msgid \"Open\"
msgstr \"Öffnen\"

msgid \"file\"
msgid_plural \"files\"
msgstr[0] \"Datei\"
msgstr[1] \"Dateien\"

#~ msgid \"Obsolete\"
#~ msgstr \"Veraltet\"
";

/// Bytes that fail to decode: the string on line 2 is never closed.
pub const BROKEN: &str = "msgid \"Hello\"
msgstr \"Bonjour
";
