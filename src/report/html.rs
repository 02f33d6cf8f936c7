//! Minimal HTML listing of findings.

use std::fmt::Write as _;

use crate::finding::Finding;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
.finding{border-bottom:1px solid #ddd;padding:.6em 0}\
.platform{font-weight:bold}\
footer{margin-top:2em;color:#888;font-size:.85em}";

/// Escapes text for interpolation into HTML element content or attributes.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn optional(value: Option<&str>) -> String {
    escape_html(value.unwrap_or_default())
}

/// Renders the report page.
#[must_use]
pub fn render_html(findings: &[Finding]) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str("<title>Profile Finder Report</title>");
    let _ = write!(html, "<style>{STYLE}</style></head><body>\n");
    let _ = writeln!(
        html,
        "<h1>Profile Finder Report</h1><p>{} finding(s)</p>",
        findings.len()
    );

    for finding in findings {
        let url = escape_html(&finding.url);
        let _ = writeln!(
            html,
            "<div class=\"finding\"><span class=\"platform\">{}</span> | <a href=\"{url}\">{url}</a><br>",
            escape_html(&finding.platform)
        );
        let _ = writeln!(
            html,
            "Username: {} | Name: {}<br>",
            escape_html(&finding.username),
            optional(finding.full_name.as_deref())
        );
        let _ = writeln!(
            html,
            "Bio: {}<br>Location: {}<br>",
            optional(finding.bio.as_deref()),
            optional(finding.location.as_deref())
        );
        if finding.followers.is_some() || finding.following.is_some() || finding.posts.is_some() {
            let _ = writeln!(
                html,
                "Followers: {} | Following: {} | Posts: {}<br>",
                count(finding.followers),
                count(finding.following),
                count(finding.posts)
            );
        }
        let _ = writeln!(
            html,
            "Emails: {} | Phones: {}</div>",
            escape_html(&finding.emails.join(", ")),
            escape_html(&finding.phones.join(", "))
        );
    }

    let _ = writeln!(
        html,
        "<footer>Generated by profile-finder {}</footer></body></html>",
        env!("CARGO_PKG_VERSION")
    );
    html
}

fn count(value: Option<u64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_escapes_every_field() {
        let mut finding = Finding::new("Git<Hub>", "https://github.com/a?x=1&y=2", "<script>");
        finding.bio = Some("I <3 Rust".to_string());
        finding.emails = vec!["a&b@example.com".to_string()];

        let html = render_html(&[finding]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("Git&lt;Hub&gt;"));
        assert!(html.contains("https://github.com/a?x=1&amp;y=2"));
        assert!(html.contains("I &lt;3 Rust"));
        assert!(html.contains("a&amp;b@example.com"));
    }

    #[test]
    fn test_render_lists_every_finding() {
        let findings = vec![
            Finding::new("GitHub", "https://github.com/alice", "alice"),
            Finding::new("GitLab", "https://gitlab.com/alice", "alice"),
        ];
        let html = render_html(&findings);
        assert_eq!(html.matches("class=\"finding\"").count(), 2);
        assert!(html.contains("2 finding(s)"));
    }

    #[test]
    fn test_counts_only_rendered_when_known() {
        let mut finding = Finding::new("Instagram", "https://instagram.com/alice", "alice");
        assert!(!render_html(std::slice::from_ref(&finding)).contains("Followers:"));
        finding.followers = Some(10);
        assert!(render_html(&[finding]).contains("Followers: 10 | Following:  | Posts: "));
    }
}
