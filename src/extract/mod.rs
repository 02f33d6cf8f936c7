//! Best-effort contact and profile extraction from fetched pages.
//!
//! Everything here is a heuristic over text: regexes for emails and phone
//! numbers, and a few HTML element lookups for the display name, bio and
//! location. Extraction never fails because of page content; only an
//! unusable candidate URL is an error.

mod contacts;
mod profile;

use thiserror::Error;

pub use contacts::extract_contacts;
pub(crate) use contacts::collapse_whitespace;
pub use profile::{extract_profile, username_from_url};

/// Errors raised while turning a fetched page into a finding.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The candidate URL could not be parsed.
    #[error("cannot parse candidate URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// The candidate URL carries neither a path segment nor a search term.
    #[error("no username in candidate URL: {url}")]
    MissingUsername {
        /// The offending URL.
        url: String,
    },
}

impl ExtractError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a missing username error.
    pub fn missing_username(url: impl Into<String>) -> Self {
        Self::MissingUsername { url: url.into() }
    }
}
