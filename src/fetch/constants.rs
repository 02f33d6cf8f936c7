//! Constants for the fetch module (timeouts, fallback endpoint, block markers).

/// Default per-request timeout (15 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Search engine endpoint used when a profile page blocks us.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.google.com/search";

/// Lowercase body markers that identify a bot-check page regardless of status.
pub const BLOCK_MARKERS: &[&str] = &["captcha", "unusual traffic"];
