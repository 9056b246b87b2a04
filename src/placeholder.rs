//! Sample-phrase placeholder scanning and synonym sanitizing.
//!
//! A phrase template is plain text interleaved with `{entityName}` markers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Digits, ASCII letters, Latin-1 letters (À-ÿ), apostrophes, hyphens and spaces survive.
    static ref SYNONYM_STRIP_REGEX: Regex = Regex::new(r"[^0-9A-Za-z\x{00C0}-\x{00FF}' -]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseToken<'a> {
    /// Literal text. Gaps between two adjacent markers yield an empty literal.
    Text(&'a str),
    /// Placeholder name without braces.
    Placeholder(&'a str),
}

/// Splits a phrase into literal text and placeholders, left to right.
///
/// Every gap before, between and after markers is reported, even when empty,
/// so callers can decide which empty gaps matter. A phrase without markers is
/// returned as one literal. `{}` and unterminated braces stay literal text.
pub fn tokenize_phrase(phrase: &str) -> Vec<PhraseToken<'_>> {
    let bytes = phrase.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < bytes.len() && bytes[j] != b'}' && bytes[j] != b'{' {
            j += 1;
        }

        if j < bytes.len() && bytes[j] == b'}' && j > i + 1 {
            tokens.push(PhraseToken::Text(&phrase[literal_start..i]));
            tokens.push(PhraseToken::Placeholder(&phrase[i + 1..j]));
            i = j + 1;
            literal_start = i;
        } else {
            // Not a marker; a nested `{` restarts the scan there.
            i = j.max(i + 1);
        }
    }

    tokens.push(PhraseToken::Text(&phrase[literal_start..]));
    tokens
}

/// Names of all placeholders in a phrase, in order of appearance.
pub fn placeholder_names(phrase: &str) -> Vec<&str> {
    tokenize_phrase(phrase)
        .into_iter()
        .filter_map(|token| match token {
            PhraseToken::Placeholder(name) => Some(name),
            PhraseToken::Text(_) => None,
        })
        .collect()
}

/// Strips characters the platform does not accept in entity synonyms.
pub fn sanitize_synonym(input: &str) -> String {
    SYNONYM_STRIP_REGEX.replace_all(input, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use PhraseToken::{Placeholder, Text};

    #[test]
    fn test_tokenize_text_and_markers() {
        assert_eq!(
            tokenize_phrase("book a {city} flight"),
            vec![Text("book a "), Placeholder("city"), Text(" flight")]
        );
    }

    #[test]
    fn test_tokenize_reports_empty_gaps() {
        assert_eq!(
            tokenize_phrase("{from}{to}"),
            vec![Text(""), Placeholder("from"), Text(""), Placeholder("to"), Text("")]
        );
    }

    #[test]
    fn test_tokenize_without_markers() {
        assert_eq!(tokenize_phrase("hello world"), vec![Text("hello world")]);
    }

    #[test]
    fn test_tokenize_keeps_malformed_braces_literal() {
        assert_eq!(tokenize_phrase("a {} b {c"), vec![Text("a {} b {c")]);
        assert_eq!(
            tokenize_phrase("x {{name} y"),
            vec![Text("x {"), Placeholder("name"), Text(" y")]
        );
    }

    #[test]
    fn test_tokenize_multibyte_text() {
        assert_eq!(
            tokenize_phrase("über {städte} café"),
            vec![Text("über "), Placeholder("städte"), Text(" café")]
        );
    }

    #[test]
    fn test_placeholder_names_repeat_across_positions() {
        assert_eq!(
            placeholder_names("{city} to {city} via {hub}"),
            vec!["city", "city", "hub"]
        );
    }

    #[test]
    fn test_sanitize_synonym() {
        assert_eq!(sanitize_synonym("St. Louis!"), "St Louis");
        assert_eq!(sanitize_synonym("Rock'n'Roll"), "Rock'n'Roll");
        assert_eq!(sanitize_synonym("Zürich (ZH)"), "Zürich ZH");
        assert_eq!(sanitize_synonym("x-ray #1"), "x-ray 1");
        assert_eq!(sanitize_synonym("東京"), "");
    }
}
