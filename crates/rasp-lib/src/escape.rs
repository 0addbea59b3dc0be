//! Escape tables for literal text.

const C_ESCAPES: &[(u8, &str)] = &[
    (0x07, "\\a"),
    (0x08, "\\b"),
    (0x0C, "\\f"),
    (b'\n', "\\n"),
    (b'\r', "\\r"),
    (b'\t', "\\t"),
    (0x0B, "\\v"),
    (b'\\', "\\\\"),
    (b'\'', "\\'"),
    (b'"', "\\\""),
    (0, "\\0"),
];

const REGEX_ESCAPES: &[(u8, &str)] = &[(b'/', "\\/")];

fn escape_with(s: &str, table: &[(u8, &str)]) -> String {
    let mut out = String::new();
    for &b in s.as_bytes() {
        match table.iter().find(|(raw, _)| *raw == b) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(b as char),
        }
    }
    out
}

fn unescape_with(s: &str, table: &[(u8, &str)]) -> String {
    let bytes = s.as_bytes();
    let mut out = String::new();
    let mut i = 0;
    while i < bytes.len() {
        if i + 1 < bytes.len()
            && let Some((raw, _)) = table
                .iter()
                .find(|(_, escaped)| escaped.as_bytes() == &bytes[i..i + 2])
        {
            out.push(*raw as char);
            i += 2;
            continue;
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Escape control bytes, quotes, and backslashes.
pub fn escape(s: &str) -> String {
    escape_with(s, C_ESCAPES)
}

/// Undo [`escape`].
pub fn unescape(s: &str) -> String {
    unescape_with(s, C_ESCAPES)
}

/// Undo the `\/` escaping used inside `/regex/` literals.
pub fn unescape_regex(s: &str) -> String {
    unescape_with(s, REGEX_ESCAPES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_control_bytes() {
        assert_eq!(escape("a\nb\t'c'"), "a\\nb\\t\\'c\\'");
        assert_eq!(unescape("a\\nb\\t\\'c\\'"), "a\nb\t'c'");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape("hello"), "hello");
        assert_eq!(unescape("hello"), "hello");
    }

    #[test]
    fn regex_slash_unescaping() {
        assert_eq!(unescape_regex("a\\/b"), "a/b");
        assert_eq!(unescape_regex("a\\nb"), "a\\nb");
    }
}
