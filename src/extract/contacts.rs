//! Email and phone number extraction from free text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Minimum number of digits for a phone candidate to be kept.
const MIN_PHONE_DIGITS: usize = 8;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+\-]+@[a-zA-Z0-9\-]+\.[a-zA-Z0-9.\-]+").expect("email regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d[\d\-\s()]{6,}\d").expect("phone regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Extracts email addresses and phone numbers from `text`.
///
/// Both lists are deduplicated and sorted ascending. Phone matches are
/// trimmed, internal whitespace runs collapse to a single space, and any
/// candidate with fewer than eight digits is dropped. Running the function
/// twice over the same text yields identical output.
///
/// # Example
///
/// ```
/// use profile_finder_core::extract_contacts;
///
/// let (emails, phones) = extract_contacts("mail bob@example.com or call +62 812-3456-7890");
/// assert_eq!(emails, vec!["bob@example.com"]);
/// assert_eq!(phones, vec!["+62 812-3456-7890"]);
/// ```
#[must_use]
pub fn extract_contacts(text: &str) -> (Vec<String>, Vec<String>) {
    let emails: BTreeSet<String> = EMAIL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let phones: BTreeSet<String> = PHONE_PATTERN
        .find_iter(text)
        .map(|m| normalize_phone(m.as_str()))
        .filter(|phone| digit_count(phone) >= MIN_PHONE_DIGITS)
        .collect();

    (emails.into_iter().collect(), phones.into_iter().collect())
}

/// Collapses every whitespace run in `text` to one space and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

fn normalize_phone(raw: &str) -> String {
    collapse_whitespace(raw)
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}
