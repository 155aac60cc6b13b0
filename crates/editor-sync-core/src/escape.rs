//! Escaping text for embedding in a single-quoted script literal.

/// Substitutions applied in order, each over the whole text.
///
/// Backslash goes first so the escapes inserted by later entries are never
/// escaped again.
const ESCAPES: [(&str, &str); 9] = [
    ("\\", "\\\\"),
    ("\n", "\\n"),
    ("\r", "\\r"),
    ("\x0c", "\\f"),
    ("\t", "\\t"),
    ("\x0b", "\\v"),
    ("\x08", "\\b"),
    ("'", "\\'"),
    ("\"", "\\\""),
];

/// Escape `text` so it can sit between quotes in a generated script.
pub fn escape_script_literal(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Decode a script string literal body the way the page's script engine does.
///
/// Unknown escapes decode to the escaped character itself; a trailing lone
/// backslash is kept.
pub fn unescape_script_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0b'),
            Some('b') => out.push('\x08'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
