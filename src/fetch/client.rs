//! Page fetcher with identity rotation, retry/backoff and search fallback.
//!
//! The [`Fetcher`] is created once per scan and shared across worker tasks,
//! taking advantage of reqwest connection pooling.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{BLOCK_MARKERS, DEFAULT_SEARCH_ENDPOINT, REQUEST_TIMEOUT_SECS};
use super::error::FetchError;
use super::retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
use crate::user_agent::{ACCEPT_LANGUAGE_VALUE, random_user_agent};

/// Search engine queried when a profile page blocks us.
#[derive(Debug, Clone)]
pub struct SearchFallback {
    endpoint: Url,
}

impl SearchFallback {
    /// Creates a fallback against a custom search endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `endpoint` is not an absolute URL.
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint).map_err(|_| FetchError::invalid_url(endpoint))?;
        Ok(Self { endpoint })
    }

    /// Builds the `site:<host> <term>` query URL for a blocked candidate.
    ///
    /// The term is the candidate's `q` query parameter when present (search
    /// style candidates), otherwise its last non-empty path segment.
    #[must_use]
    pub fn query_url(&self, blocked_url: &str) -> Option<Url> {
        let parsed = Url::parse(blocked_url).ok()?;
        let host = parsed.host_str()?;
        let term = fallback_term(&parsed)?;

        let mut query_url = self.endpoint.clone();
        query_url
            .query_pairs_mut()
            .append_pair("q", &format!("site:{host} {term}"));
        Some(query_url)
    }
}

impl Default for SearchFallback {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_SEARCH_ENDPOINT)
                .unwrap_or_else(|_| unreachable!("default search endpoint is a valid URL")),
        }
    }
}

fn fallback_term(url: &Url) -> Option<String> {
    if let Some((_, q)) = url.query_pairs().find(|(key, _)| key == "q")
        && !q.is_empty()
    {
        return Some(q.into_owned());
    }

    let segment = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()?;
    Some(
        urlencoding::decode(segment)
            .map_or_else(|_| segment.to_string(), std::borrow::Cow::into_owned),
    )
}

/// Fetch layer configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Retry / backoff policy for transient failures.
    pub retry_policy: RetryPolicy,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Search fallback for blocked pages; `None` disables it.
    pub search_fallback: Option<SearchFallback>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            search_fallback: Some(SearchFallback::default()),
        }
    }
}

/// Where a fetched body came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// The candidate URL itself.
    Direct,
    /// The search engine, after the candidate blocked us.
    SearchFallback {
        /// The query URL that was fetched.
        query_url: String,
    },
}

/// A successfully fetched body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response body text.
    pub body: String,
    /// Which request produced the body.
    pub source: PageSource,
}

/// HTTP fetcher for candidate profile pages.
///
/// # Example
///
/// ```no_run
/// use profile_finder_core::fetch::{FetchConfig, Fetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new(FetchConfig::default())?;
/// if let Some(page) = fetcher.fetch("https://github.com/alice").await {
///     println!("{} bytes", page.body.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Creates a fetcher with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { client, config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches a candidate page, returning its body or nothing.
    ///
    /// Transient failures and rate limiting are retried with exponential
    /// backoff. A blocked response ends the retry loop immediately and, when
    /// the search fallback is enabled, one search request is issued instead.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        let policy = &self.config.retry_policy;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            info!(attempt, "requesting");

            let error = match self.attempt(url).await {
                Ok(body) => {
                    return Some(FetchedPage {
                        body,
                        source: PageSource::Direct,
                    });
                }
                Err(e) => e,
            };

            let failure_type = classify_error(&error);
            if failure_type == FailureType::Blocked {
                warn!(error = %error, "request blocked");
                return self.search_fallback(url).await;
            }

            match policy.should_retry(failure_type, attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    warn!(
                        error = %error,
                        next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(error = %error, %reason, "giving up on url");
                    return None;
                }
            }
        }
    }

    /// Performs a single GET and classifies the response.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Blocked`] for 401/403 or a bot-check body
    /// - [`FetchError::HttpStatus`] for any other non-success status
    /// - [`FetchError::Timeout`] / [`FetchError::Network`] for transport failures
    pub async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status().as_u16();
        if matches!(status, 401 | 403) {
            return Err(FetchError::blocked(url, format!("HTTP {status}")));
        }
        if status == 429 {
            return Err(FetchError::http_status(url, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        if let Some(marker) = find_block_marker(&body) {
            return Err(FetchError::blocked(
                url,
                format!("'{marker}' marker in response body"),
            ));
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::http_status(url, status));
        }

        Ok(body)
    }

    async fn search_fallback(&self, blocked_url: &str) -> Option<FetchedPage> {
        let fallback = self.config.search_fallback.as_ref()?;
        let Some(query_url) = fallback.query_url(blocked_url) else {
            warn!(url = %blocked_url, "cannot build search fallback query");
            return None;
        };

        info!(query_url = %query_url, "falling back to search");
        match self.attempt(query_url.as_str()).await {
            Ok(body) => Some(FetchedPage {
                body,
                source: PageSource::SearchFallback {
                    query_url: query_url.to_string(),
                },
            }),
            Err(e) => {
                warn!(error = %e, "fallback search failed");
                None
            }
        }
    }
}

/// Returns the first bot-check marker found in `body`, case-insensitively.
#[must_use]
pub fn find_block_marker(body: &str) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    BLOCK_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}
