//! HTTP fetch layer for candidate profile pages.
//!
//! This module provides the [`Fetcher`], which sends each request with a
//! rotated browser identity, retries transient failures with exponential
//! backoff, detects bot-check pages and optionally falls back to a site
//! scoped web search when a platform blocks us.

pub mod client;
pub mod constants;
mod error;
mod retry;

pub use client::{FetchConfig, FetchedPage, Fetcher, PageSource, SearchFallback, find_block_marker};
pub use error::FetchError;
pub use retry::{DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, classify_error};
