//! Case-insensitive ordinal comparison used at every sort and group site.
//!
//! Strings are compared char by char after simple uppercasing, which is the
//! ordinal-ignore-case rule: `_` (0x5F) sorts after every letter, not between
//! `Z` and `a`. Two strings that are equal ignoring case are then ordered
//! ordinally, so the resulting order is total and never depends on input
//! enumeration order.

use std::cmp::Ordering;

/// Compare two strings ignoring case, falling back to ordinal order.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase));
    folded.then_with(|| a.cmp(b))
}

/// Compare two optional strings; `None` sorts before any value.
pub fn cmp_option_ignore_case(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cmp_ignore_case(a, b),
    }
}

/// Equality ignoring case.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_uppercase)
        .eq(b.chars().flat_map(char::to_uppercase))
}

/// Grouping key for case-insensitive de-duplication.
pub fn fold_key(value: &str) -> String {
    value.to_uppercase()
}

/// True when `value` starts with `prefix`, ignoring case.
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    let mut value_chars = value.chars().flat_map(char::to_uppercase);
    prefix
        .chars()
        .flat_map(char::to_uppercase)
        .all(|p| value_chars.next() == Some(p))
}

/// Returns the trimmed value, or `None` when it is absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
