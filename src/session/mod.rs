//! Authenticated single-profile lookups through an existing login session.
//!
//! Unlike the scan pipeline, this path targets one profile on one platform
//! and talks to its JSON endpoints with the cookies of a logged-in browser
//! session, which exposes richer fields (counts, picture) and the masked
//! contact hints of the password-recovery flow.

pub mod cookies;
mod instagram;

use thiserror::Error;

pub use cookies::{CookieFileError, SessionCookie};
pub use instagram::{
    ContactHint, INSTAGRAM_PLATFORM, InstagramClient, InstagramEndpoints, detect_location,
};

/// Errors from the authenticated lookup.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session cookie file is missing or unreadable.
    #[error(transparent)]
    CookieFile(#[from] CookieFileError),

    /// The session is not (or no longer) logged in.
    #[error("session invalid: {reason}")]
    SessionInvalid {
        /// What gave it away.
        reason: String,
    },

    /// The target profile does not exist.
    #[error("profile not found: {username}")]
    ProfileNotFound {
        /// The requested username.
        username: String,
    },

    /// Transport failure talking to the platform.
    #[error("network error calling {url}: {source}")]
    Network {
        /// Endpoint URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Unexpected non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Endpoint URL.
        url: String,
        /// Status code.
        status: u16,
    },

    /// The response body was not the expected JSON.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// Endpoint URL.
        url: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {url}")]
    InvalidEndpoint {
        /// The URL that failed to build.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl SessionError {
    /// Creates a session invalid error.
    pub fn session_invalid(reason: impl Into<String>) -> Self {
        Self::SessionInvalid {
            reason: reason.into(),
        }
    }

    /// Creates a profile not found error.
    pub fn profile_not_found(username: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            username: username.into(),
        }
    }

    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>) -> Self {
        Self::InvalidEndpoint { url: url.into() }
    }
}
