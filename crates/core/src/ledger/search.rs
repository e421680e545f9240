//! List query parameters: free-text search and enum filters.

use std::str::FromStr;

/// Equality filter over an enum column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    /// No filter requested.
    Any,
    /// Only rows with this value.
    Only(T),
    /// A value outside the enum was requested; no row can match.
    Nothing,
}

impl<T: FromStr> Filter<T> {
    /// Parses a query-string value. Missing or empty means [`Filter::Any`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Any,
            Some(value) => value.parse().map_or(Self::Nothing, Self::Only),
        }
    }
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::Any
    }
}

/// Search term; `None` when absent or empty.
#[must_use]
pub fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

/// Escape character used in [`contains_pattern`].
pub const LIKE_ESCAPE: char = '\\';

/// Builds a lowercase `LIKE` pattern matching `term` anywhere.
///
/// `%`, `_` and the escape character itself are matched literally.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    literal_pattern(&term.to_lowercase())
}

/// Like [`contains_pattern`], keeping the case of `term`.
#[must_use]
pub fn literal_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
