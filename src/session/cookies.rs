//! Session cookie files in the Netscape format.
//!
//! Browser extensions export logged-in sessions as Netscape cookie files
//! (7 TAB-separated fields per line). The cookies for the session's domain
//! are loaded into a `reqwest` jar scoped to the endpoints we talk to.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use reqwest::cookie::Jar;
use tracing::{debug, instrument, warn};
use url::Url;

/// One cookie from a session file.
///
/// The value is redacted in Debug output; session cookies are credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Domain the cookie belongs to (e.g. `.instagram.com`).
    pub domain: String,
    /// Path scope.
    pub path: String,
    /// Unix expiry timestamp, 0 for a session cookie.
    pub expires: u64,
    /// Cookie name.
    pub name: String,
    value: String,
}

impl SessionCookie {
    /// Returns the cookie value. Never log it.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// True if the cookie applies to `domain` or one of its subdomains.
    #[must_use]
    pub fn matches_domain(&self, domain: &str) -> bool {
        let own = self.domain.trim_start_matches('.').to_ascii_lowercase();
        let domain = domain.trim_start_matches('.').to_ascii_lowercase();
        own == domain || own.ends_with(&format!(".{domain}"))
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Errors reading a session cookie file.
#[derive(Debug, thiserror::Error)]
pub enum CookieFileError {
    /// The file could not be read.
    #[error("cannot read session file: {0}")]
    Io(#[from] std::io::Error),

    /// The file has data lines but none of them is a valid cookie.
    #[error("no valid cookies in session file ({malformed} malformed lines)")]
    NoCookies {
        /// Number of lines that failed to parse.
        malformed: usize,
    },
}

/// Reads and parses a Netscape cookie file.
///
/// # Errors
///
/// See [`parse_cookie_file`].
pub fn read_cookie_file(path: &Path) -> Result<Vec<SessionCookie>, CookieFileError> {
    let file = File::open(path)?;
    parse_cookie_file(BufReader::new(file))
}

/// Parses Netscape cookie lines.
///
/// Blank lines and `#` comments are skipped, except the `#HttpOnly_` prefix
/// some exporters put in front of the domain. Malformed lines are logged and
/// skipped.
///
/// # Errors
///
/// Returns [`CookieFileError::Io`] on read failure and
/// [`CookieFileError::NoCookies`] if data lines exist but none parses.
#[instrument(level = "debug", skip(reader))]
pub fn parse_cookie_file(reader: impl BufRead) -> Result<Vec<SessionCookie>, CookieFileError> {
    let mut cookies = Vec::new();
    let mut malformed = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Ok(cookie) => {
                debug!(line = idx + 1, domain = %cookie.domain, name = %cookie.name, "parsed cookie");
                cookies.push(cookie);
            }
            Err(reason) => {
                warn!(line = idx + 1, %reason, "skipping malformed cookie line");
                malformed += 1;
            }
        }
    }

    if cookies.is_empty() && malformed > 0 {
        return Err(CookieFileError::NoCookies { malformed });
    }
    Ok(cookies)
}

fn parse_line(line: &str) -> Result<SessionCookie, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [domain, _tailmatch, path, secure, expires, name, value] = fields[..] else {
        return Err(format!(
            "expected 7 TAB-separated fields, found {}",
            fields.len()
        ));
    };

    if domain.is_empty() {
        return Err("domain field is empty".to_string());
    }
    if name.is_empty() {
        return Err("cookie name field is empty".to_string());
    }
    // Endpoints are rescoped host-only below, so the HTTPS-only flag is
    // only validated, not kept.
    if !matches!(secure, "TRUE" | "FALSE") {
        return Err(format!("secure field must be TRUE or FALSE, got '{secure}'"));
    }
    // Some exporters write fractional or negative expiries for session cookies.
    let expires = expires
        .split('.')
        .next()
        .and_then(|whole| whole.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(SessionCookie {
        domain: domain.to_string(),
        path: if path.is_empty() { "/" } else { path }.to_string(),
        expires,
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Builds a cookie jar that sends `cookies` to each of `origins`.
///
/// Cookies are stored host-only for every origin so the same session can be
/// pointed at alternate endpoints. Expired cookies are dropped by the jar.
#[instrument(level = "debug", skip_all, fields(cookies = cookies.len(), origins = origins.len()))]
pub fn load_into_jar(cookies: &[SessionCookie], origins: &[Url]) -> Arc<Jar> {
    let jar = Arc::new(Jar::default());
    for origin in origins {
        for cookie in cookies {
            jar.add_cookie_str(&set_cookie_string(cookie), origin);
        }
        debug!(origin = %origin, "loaded session cookies");
    }
    jar
}

fn set_cookie_string(cookie: &SessionCookie) -> String {
    let mut parts = vec![
        format!("{}={}", cookie.name, cookie.value()),
        format!("Path={}", cookie.path),
    ];
    if cookie.expires > 0 {
        match UNIX_EPOCH.checked_add(Duration::from_secs(cookie.expires)) {
            Some(time) => parts.push(format!("Expires={}", httpdate::fmt_http_date(time))),
            None => warn!(
                name = %cookie.name,
                expires = cookie.expires,
                "cookie expiry overflows SystemTime; treating as session cookie"
            ),
        }
    }
    parts.join("; ")
}
