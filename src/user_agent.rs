//! Browser User-Agent pool used to rotate client identity between requests.

use rand::seq::SliceRandom;

/// Browser identities rotated across fetch attempts.
pub(crate) const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:130.0) Gecko/20100101 Firefox/130.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:140.0) Gecko/20100101 Firefox/140.0",
];

/// Language header sent with every scrape request.
pub(crate) const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Picks a random User-Agent from [`USER_AGENT_POOL`].
#[must_use]
pub(crate) fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENT_POOL
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENT_POOL[0])
}
