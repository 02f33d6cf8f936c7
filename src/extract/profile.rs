//! Best-effort profile field extraction from a fetched HTML document.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

use super::ExtractError;
use super::contacts::{collapse_whitespace, extract_contacts};
use crate::finding::Finding;

/// Number of leading paragraphs used as the bio.
const BIO_PARAGRAPHS: usize = 2;

#[allow(clippy::expect_used)]
static LOCATION_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(location|city|kota|alamat)\b").expect("location regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

#[allow(clippy::expect_used)]
static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("paragraph selector is valid"));

#[allow(clippy::expect_used)]
static LOCATION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span, div").expect("location selector is valid"));

/// Builds a [`Finding`] for `url` from the fetched `body`.
///
/// The username comes from the URL (its `q` parameter for search style
/// candidates, otherwise the last path segment). Contacts are extracted from
/// the collapsed document text, the full name from `<title>`, the bio from the
/// first two paragraphs and the location from the first `span`/`div` whose
/// own text carries a location keyword.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidUrl`] if `url` cannot be parsed and
/// [`ExtractError::MissingUsername`] if no username can be derived from it.
pub fn extract_profile(platform: &str, url: &str, body: &str) -> Result<Finding, ExtractError> {
    let username = username_from_url(url)?;
    let document = Html::parse_document(body);

    let text = collapse_whitespace(&document.root_element().text().collect::<Vec<_>>().join(" "));
    let (emails, phones) = extract_contacts(&text);

    let mut finding = Finding::new(platform, url, username);
    finding.full_name = title(&document);
    finding.bio = bio(&document);
    finding.location = location(&document);
    finding.emails = emails;
    finding.phones = phones;

    debug!(
        platform,
        url,
        emails = finding.emails.len(),
        phones = finding.phones.len(),
        "extracted profile"
    );
    Ok(finding)
}

/// Derives the profile username from a candidate URL.
///
/// # Errors
///
/// See [`extract_profile`].
pub fn username_from_url(url: &str) -> Result<String, ExtractError> {
    let parsed = Url::parse(url).map_err(|_| ExtractError::invalid_url(url))?;

    if let Some((_, q)) = parsed.query_pairs().find(|(key, _)| key == "q")
        && !q.trim().is_empty()
    {
        return Ok(q.trim().to_string());
    }

    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .map(|segment| {
            urlencoding::decode(segment)
                .map_or_else(|_| segment.to_string(), std::borrow::Cow::into_owned)
        })
        .ok_or_else(|| ExtractError::missing_username(url))
}

fn title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|title| !title.is_empty())
}

fn bio(document: &Html) -> Option<String> {
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH_SELECTOR)
        .take(BIO_PARAGRAPHS)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .collect();
    let bio = collapse_whitespace(&paragraphs.join(" "));
    (!bio.is_empty()).then_some(bio)
}

fn location(document: &Html) -> Option<String> {
    document
        .select(&LOCATION_SELECTOR)
        .map(|element| own_text(&element))
        .find(|text| LOCATION_HINT.is_match(text))
}

/// Text of the element's direct text children, excluding descendants.
fn own_text(element: &ElementRef<'_>) -> String {
    let joined: String = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();
    collapse_whitespace(&joined)
}
