use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Single-quoted SQL string literal, with `''` as the embedded-quote escape.
static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'(?:[^']|'')*'").expect("static regex"));

/// Replaces every string literal in a SQL statement with `'?'`.
///
/// Predicates and pivot values are caller text and may carry personal data;
/// identifiers and numbers are left untouched.
pub fn scrub(sql: &str) -> String {
    STRING_LITERAL.replace_all(sql, "'?'").into_owned()
}

/// The form of `sql` to write to logs under the given scrub setting.
pub fn loggable(sql: &str, scrub_enabled: bool) -> Cow<'_, str> {
    if scrub_enabled {
        Cow::Owned(scrub(sql))
    } else {
        Cow::Borrowed(sql)
    }
}
