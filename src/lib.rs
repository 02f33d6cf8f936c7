//! Profile Finder Core Library
//!
//! This library provides the core functionality for the profile-finder tool,
//! which guesses social media profile URLs for a username or email, fetches
//! them politely, and scrapes lightweight contact signals into reports.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`registry`] - Known platform domains and platform name lookup
//! - [`fetch`] - HTTP fetch layer with retry, backoff and blocked detection
//! - [`extract`] - Best-effort contact / bio / location extraction
//! - [`scan`] - Bounded-concurrency batch orchestration with cooperative shutdown
//! - [`report`] - JSON, CSV and HTML report writers
//! - [`session`] - Authenticated single-profile lookup through a cookie session

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod extract;
pub mod fetch;
pub mod finding;
pub mod registry;
pub mod report;
pub mod scan;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use extract::{ExtractError, extract_contacts, extract_profile};
pub use fetch::{
    DEFAULT_MAX_RETRIES, FailureType, FetchConfig, FetchError, FetchedPage, Fetcher, PageSource,
    RetryDecision, RetryPolicy, SearchFallback, classify_error,
};
pub use finding::{Finding, PartialFindings};
pub use registry::{DomainRegistry, Platform};
pub use report::{OutputFormat, ReportError, ReportPaths, save_results, timestamped_base};
pub use scan::{
    Candidate, DEFAULT_CONCURRENCY, NoProgress, ScanEngine, ScanError, ScanMode, ScanOptions,
    ScanProgress, ScanReport, ShutdownSignal, build_candidates,
};
pub use session::{ContactHint, InstagramClient, InstagramEndpoints, SessionError};
