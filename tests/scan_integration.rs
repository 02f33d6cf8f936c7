//! Integration tests for the scan engine.
//!
//! Candidates for the built-in registry are redirected to a mock server that
//! serves a handful of profile pages and 404s everything else.

use std::sync::Mutex;
use std::time::Duration;

use profile_finder_core::{
    Candidate, DomainRegistry, FetchConfig, Fetcher, Finding, NoProgress, OutputFormat,
    PartialFindings, RetryPolicy, ScanEngine, ScanMode, ScanOptions, ScanProgress,
    ShutdownSignal, build_candidates, save_results, timestamped_base,
};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FOUND_ON: [&str; 3] = ["github.com", "gitlab.com", "medium.com"];

fn profile_page(domain: &str) -> String {
    format!(
        "<html><head><title>Alice on {domain}</title></head><body>\
         <p>Backend developer.</p><p>Mail alice@example.com</p>\
         <span>Location: Jakarta</span></body></html>"
    )
}

async fn mount_profiles(server: &MockServer) {
    for domain in FOUND_ON {
        Mock::given(method("GET"))
            .and(path(format!("/{domain}/alice")))
            .respond_with(ResponseTemplate::new(200).set_body_string(profile_page(domain)))
            .mount(server)
            .await;
    }
}

/// Points each candidate at `<server>/<original host><original path>`.
fn redirect_to(server: &MockServer, candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .map(|candidate| {
            let original = Url::parse(&candidate.url).unwrap();
            let host = original.host_str().unwrap();
            let url = format!("{}/{host}{}", server.uri(), original.path());
            Candidate::new(candidate.platform, url)
        })
        .collect()
}

fn engine(concurrency: usize) -> ScanEngine {
    let fetcher = Fetcher::new(FetchConfig {
        retry_policy: RetryPolicy::with_max_attempts(1),
        request_timeout: Duration::from_secs(5),
        search_fallback: None,
    })
    .unwrap();
    ScanEngine::new(concurrency, fetcher, ScanOptions::without_throttle()).unwrap()
}

#[tokio::test]
async fn test_username_scan_collects_matching_profiles() {
    let server = MockServer::start().await;
    mount_profiles(&server).await;

    let registry = DomainRegistry::builtin();
    let candidates = build_candidates(["alice"], ScanMode::Username, &registry);
    assert_eq!(candidates.len(), 45);
    let candidates = redirect_to(&server, candidates);

    let partial = PartialFindings::new();
    let report = engine(6)
        .run(candidates, &partial, &ShutdownSignal::new(), &NoProgress)
        .await;

    assert!(!report.interrupted);
    assert_eq!(report.total, 45);
    assert_eq!(report.found, 3);
    assert_eq!(report.skipped, 42);
    assert_eq!(partial.len(), 3);

    let mut platforms: Vec<_> = report.findings.iter().map(|f| f.platform.as_str()).collect();
    platforms.sort_unstable();
    assert_eq!(platforms, vec!["GitHub", "GitLab", "Medium"]);

    let github = report
        .findings
        .iter()
        .find(|f| f.platform == "GitHub")
        .unwrap();
    assert_eq!(github.username, "alice");
    assert_eq!(github.full_name.as_deref(), Some("Alice on github.com"));
    assert_eq!(github.emails, vec!["alice@example.com".to_string()]);
    assert!(github.location.as_deref().unwrap().contains("Jakarta"));
}

#[tokio::test]
async fn test_scan_results_save_to_json_and_html() {
    let server = MockServer::start().await;
    mount_profiles(&server).await;

    let candidates = redirect_to(
        &server,
        build_candidates(["alice"], ScanMode::Username, &DomainRegistry::builtin()),
    );
    let report = engine(4)
        .run(
            candidates,
            &PartialFindings::new(),
            &ShutdownSignal::new(),
            &NoProgress,
        )
        .await;

    let dir = TempDir::new().unwrap();
    let base = timestamped_base("results_username");
    let paths = save_results(&report.findings, &base, OutputFormat::Json, dir.path()).unwrap();

    assert!(
        paths
            .data
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("results_username_")
    );
    let saved: Vec<Finding> =
        serde_json::from_str(&std::fs::read_to_string(&paths.data).unwrap()).unwrap();
    assert_eq!(saved.len(), 3);

    let html = std::fs::read_to_string(&paths.html).unwrap();
    assert_eq!(html.matches("class=\"finding\"").count(), 3);
}

#[tokio::test]
async fn test_empty_candidate_list_completes_immediately() {
    let report = engine(2)
        .run(
            Vec::new(),
            &PartialFindings::new(),
            &ShutdownSignal::new(),
            &NoProgress,
        )
        .await;
    assert_eq!(report.total, 0);
    assert_eq!(report.found, 0);
    assert!(!report.interrupted);
}

/// Requests shutdown as soon as the first profile is reported.
struct StopOnFirstFind {
    shutdown: ShutdownSignal,
    found: Mutex<Vec<String>>,
}

impl ScanProgress for StopOnFirstFind {
    fn on_found(&self, _found: usize, _total: usize, finding: &Finding) {
        if let Ok(mut found) = self.found.lock() {
            found.push(finding.platform.clone());
        }
        self.shutdown.request();
    }
}

#[tokio::test]
async fn test_shutdown_stops_consuming_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile_page("anywhere")))
        .mount(&server)
        .await;

    let candidates = redirect_to(
        &server,
        build_candidates(["alice"], ScanMode::Username, &DomainRegistry::builtin()),
    );
    let shutdown = ShutdownSignal::new();
    let progress = StopOnFirstFind {
        shutdown: shutdown.clone(),
        found: Mutex::new(Vec::new()),
    };
    let partial = PartialFindings::new();

    let report = engine(1)
        .run(candidates, &partial, &shutdown, &progress)
        .await;

    assert!(report.interrupted);
    assert_eq!(report.found, 1);
    assert_eq!(partial.len(), 1);
    assert_eq!(progress.found.lock().unwrap().len(), 1);
}
