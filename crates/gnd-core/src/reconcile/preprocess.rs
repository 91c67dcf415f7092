//! Query text preprocessing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::syntax;

/// GND identifiers: persons, corporate bodies, subjects, works and the
/// older hyphenated authority numbers.
static GND_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(1[0123]?\d{7}[0-9X]|[47]\d{6}-\d|[1-9]\d{0,7}-[0-9X]|3\d{7}[0-9X])$").unwrap()
});

/// Whether a string looks like a GND identifier.
pub fn is_gnd_id(value: &str) -> bool {
    GND_ID.is_match(value.trim())
}

/// Prepare user text for the query-string parser.
///
/// Identifiers and URIs become quoted phrases, valid query syntax passes
/// through, anything else has its metacharacters replaced by spaces.
pub fn preprocess(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_gnd_id(trimmed) || trimmed.starts_with("http") {
        return format!("\"{}\"", trimmed.replace('"', "\\\""));
    }
    if syntax::is_valid(trimmed) {
        return trimmed.to_string();
    }
    syntax::clean(trimmed)
}
