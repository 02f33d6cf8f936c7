//! Batch orchestration: candidate construction and the concurrent scan loop.
//!
//! A scan takes a list of usernames or emails, crosses it with every domain
//! in the [`DomainRegistry`], and runs fetch + extract for each resulting
//! [`Candidate`] through the [`ScanEngine`].

mod engine;
mod progress;
mod shutdown;

use std::fmt;

use thiserror::Error;

pub use engine::{DEFAULT_CONCURRENCY, ScanEngine, ScanOptions, ScanReport};
pub use progress::{NoProgress, ScanProgress};
pub use shutdown::ShutdownSignal;

use crate::registry::DomainRegistry;

/// Errors from scan setup.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid concurrency value provided.
    #[error("invalid concurrency value {value}: must be between 1 and 100")]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// What the scanned items are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Items are email addresses; candidates are on-site searches.
    Email,
    /// Items are usernames; candidates are direct profile paths.
    Username,
}

impl ScanMode {
    /// Tag used in report file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One guessed profile URL and the platform it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Platform display name.
    pub platform: String,
    /// URL to fetch.
    pub url: String,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
        }
    }
}

/// Builds one candidate per (item, domain) pair, item-major.
///
/// Username mode produces `https://<domain>/<item>`; email mode produces
/// `https://<domain>/search?q=<item>`. Items are percent-encoded. The result
/// always holds `items × registry.len()` candidates.
///
/// # Example
///
/// ```
/// use profile_finder_core::{DomainRegistry, ScanMode, build_candidates};
///
/// let registry = DomainRegistry::builtin();
/// let candidates = build_candidates(["alice"], ScanMode::Username, &registry);
/// assert_eq!(candidates.len(), registry.len());
/// ```
pub fn build_candidates<I, S>(items: I, mode: ScanMode, registry: &DomainRegistry) -> Vec<Candidate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = Vec::new();
    for item in items {
        let encoded = urlencoding::encode(item.as_ref());
        for platform in registry.iter() {
            let url = match mode {
                ScanMode::Username => format!("https://{}/{encoded}", platform.domain),
                ScanMode::Email => format!("https://{}/search?q={encoded}", platform.domain),
            };
            candidates.push(Candidate::new(platform.name, url));
        }
    }
    candidates
}
