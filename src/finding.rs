//! Profile findings and the shared partial-results buffer.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// One scraped profile candidate.
///
/// Produced by the generic scraper or the authenticated session lookup and
/// never mutated afterwards. Follower / following / post counts are only
/// known to the authenticated lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Platform display name (e.g. `GitHub`).
    pub platform: String,
    /// URL the finding was scraped from.
    pub url: String,
    /// Username the profile was probed for.
    pub username: String,
    /// Display name, when one could be extracted.
    pub full_name: Option<String>,
    /// Short profile text.
    pub bio: Option<String>,
    /// Location hint.
    pub location: Option<String>,
    /// Email addresses (deduplicated, sorted for scraped pages).
    pub emails: Vec<String>,
    /// Phone numbers (deduplicated, sorted for scraped pages).
    pub phones: Vec<String>,
    /// Follower count.
    pub followers: Option<u64>,
    /// Following count.
    pub following: Option<u64>,
    /// Post count.
    pub posts: Option<u64>,
    /// Profile picture URL.
    pub profile_pic_url: Option<String>,
}

impl Finding {
    /// Creates a finding with only the identifying fields set.
    #[must_use]
    pub fn new(
        platform: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            url: url.into(),
            username: username.into(),
            full_name: None,
            bio: None,
            location: None,
            emails: Vec::new(),
            phones: Vec::new(),
            followers: None,
            following: None,
            posts: None,
            profile_pic_url: None,
        }
    }
}

/// Append-only buffer of everything found so far in this process.
///
/// Cloning yields another handle to the same buffer. Only the scan's
/// consuming loop appends; the shell snapshots it on exit or interrupt so
/// partial work can still be written out.
#[derive(Debug, Clone, Default)]
pub struct PartialFindings {
    inner: Arc<Mutex<Vec<Finding>>>,
}

impl PartialFindings {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finding.
    pub fn push(&self, finding: Finding) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(finding);
    }

    /// Returns a copy of the buffered findings in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Finding> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of buffered findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true when nothing has been buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_new_leaves_optional_fields_empty() {
        let finding = Finding::new("GitHub", "https://github.com/alice", "alice");
        assert_eq!(finding.platform, "GitHub");
        assert!(finding.full_name.is_none());
        assert!(finding.emails.is_empty());
        assert!(finding.followers.is_none());
    }

    #[test]
    fn test_finding_serializes_fields_in_declaration_order() {
        let finding = Finding::new("GitHub", "https://github.com/alice", "alice");
        let json = serde_json::to_string(&finding).unwrap();
        let platform_at = json.find("\"platform\"").unwrap();
        let url_at = json.find("\"url\"").unwrap();
        let pic_at = json.find("\"profile_pic_url\"").unwrap();
        assert!(platform_at < url_at && url_at < pic_at);
    }

    #[test]
    fn test_partial_findings_clones_share_buffer() {
        let buffer = PartialFindings::new();
        let handle = buffer.clone();
        handle.push(Finding::new("A", "https://a.test/x", "x"));
        handle.push(Finding::new("B", "https://b.test/x", "x"));

        assert_eq!(buffer.len(), 2);
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot[0].platform, "A");
        assert_eq!(snapshot[1].platform, "B");
    }

    #[test]
    fn test_partial_findings_allows_duplicates() {
        let buffer = PartialFindings::new();
        let finding = Finding::new("A", "https://a.test/x", "x");
        buffer.push(finding.clone());
        buffer.push(finding);
        assert_eq!(buffer.len(), 2);
    }
}
