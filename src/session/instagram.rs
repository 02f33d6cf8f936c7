//! Authenticated Instagram profile lookup through a browser session.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::SessionError;
use super::cookies::{load_into_jar, read_cookie_file};
use crate::extract::extract_contacts;
use crate::fetch::constants::REQUEST_TIMEOUT_SECS;
use crate::finding::Finding;
use crate::user_agent::{ACCEPT_LANGUAGE_VALUE, random_user_agent};

/// Platform name recorded on session findings.
pub const INSTAGRAM_PLATFORM: &str = "Instagram";

/// Public web app id the profile endpoint expects.
const IG_APP_ID: &str = "936619743392459";

/// Cookie holding the login session.
const SESSION_COOKIE: &str = "sessionid";

/// Cookie holding the CSRF token echoed in `X-CSRFToken`.
const CSRF_COOKIE: &str = "csrftoken";

const PROFILE_INFO_PATH: &str = "/api/v1/users/web_profile_info/";
const RECOVERY_PATH: &str = "/accounts/account_recovery_send_ajax/";
const PASSWORD_RESET_PATH: &str = "/accounts/password/reset/";
const LOGIN_PATH: &str = "/accounts/login";

/// Place names recognised in a bio, checked in order.
const LOCATION_KEYWORDS: &[&str] = &["Jakarta", "Bandung", "Surabaya", "Indonesia", "ID", "Bali"];

#[allow(clippy::expect_used)]
static LOCATION_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    LOCATION_KEYWORDS
        .iter()
        .map(|keyword| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
            (*keyword, Regex::new(&pattern).expect("location keyword regex is valid")) // Static pattern, safe to panic
        })
        .collect()
});

/// Where the session client sends its requests.
#[derive(Debug, Clone)]
pub struct InstagramEndpoints {
    /// Base of the private API host (profile info).
    pub api_base: Url,
    /// Base of the web host (password recovery).
    pub web_base: Url,
    /// Domain whose cookies are taken from the session file.
    pub cookie_domain: String,
}

impl Default for InstagramEndpoints {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://i.instagram.com/")
                .unwrap_or_else(|_| unreachable!("static API base is a valid URL")),
            web_base: Url::parse("https://www.instagram.com/")
                .unwrap_or_else(|_| unreachable!("static web base is a valid URL")),
            cookie_domain: "instagram.com".to_string(),
        }
    }
}

impl InstagramEndpoints {
    /// Points both hosts at `base`, keeping the default cookie domain.
    #[must_use]
    pub fn with_base(base: Url) -> Self {
        Self {
            api_base: base.clone(),
            web_base: base,
            ..Self::default()
        }
    }

    fn join(base: &Url, path: &str) -> Result<Url, SessionError> {
        base.join(path)
            .map_err(|_| SessionError::invalid_endpoint(format!("{base}{path}")))
    }
}

/// Obfuscated contact details from the password-recovery flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactHint {
    /// Masked email, e.g. `j***@gmail.com`.
    #[serde(rename = "contact_point")]
    pub email: Option<String>,
    /// Masked phone, e.g. `+62 *** 1234`.
    #[serde(rename = "obfuscated_phone_number")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoResponse {
    data: Option<ProfileInfoData>,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoData {
    user: Option<ProfileUser>,
}

#[derive(Debug, Deserialize)]
struct ProfileUser {
    username: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    biography: Option<String>,
    #[serde(default)]
    edge_followed_by: Option<EdgeCount>,
    #[serde(default)]
    edge_follow: Option<EdgeCount>,
    #[serde(default)]
    edge_owner_to_timeline_media: Option<EdgeCount>,
    #[serde(default)]
    profile_pic_url_hd: Option<String>,
    #[serde(default)]
    profile_pic_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EdgeCount {
    count: u64,
}

/// Single-profile client that reuses a logged-in browser session.
#[derive(Debug, Clone)]
pub struct InstagramClient {
    client: Client,
    endpoints: InstagramEndpoints,
    csrf_token: Option<String>,
}

impl InstagramClient {
    /// Loads a session cookie file and builds a client around it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::CookieFile`] if the file cannot be read or parsed
    /// - [`SessionError::SessionInvalid`] if it holds no login session cookie
    /// - [`SessionError::ClientBuild`] if the HTTP client cannot be built
    #[instrument(skip(endpoints), fields(path = %path.display()))]
    pub fn from_session_file(
        path: &Path,
        endpoints: InstagramEndpoints,
    ) -> Result<Self, SessionError> {
        let cookies: Vec<_> = read_cookie_file(path)?
            .into_iter()
            .filter(|cookie| cookie.matches_domain(&endpoints.cookie_domain))
            .collect();

        if !cookies.iter().any(|c| c.name == SESSION_COOKIE && !c.value().is_empty()) {
            return Err(SessionError::session_invalid(format!(
                "no {SESSION_COOKIE} cookie for {} in session file",
                endpoints.cookie_domain
            )));
        }

        let csrf_token = cookies
            .iter()
            .find(|c| c.name == CSRF_COOKIE)
            .map(|c| c.value().to_string());

        let jar = load_into_jar(
            &cookies,
            &[endpoints.api_base.clone(), endpoints.web_base.clone()],
        );
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(SessionError::ClientBuild)?;

        debug!(
            cookies = cookies.len(),
            has_csrf = csrf_token.is_some(),
            "loaded session"
        );
        Ok(Self {
            client,
            endpoints,
            csrf_token,
        })
    }

    /// Looks up one profile and builds a finding from it.
    ///
    /// Emails and phones come from the bio plus the password-recovery hints,
    /// which are appended when not already present. A failing hint lookup is
    /// logged and ignored.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionInvalid`] on 401/403 or a redirect to login
    /// - [`SessionError::ProfileNotFound`] on 404 or an empty user payload
    /// - [`SessionError::Network`] / [`SessionError::HttpStatus`] / [`SessionError::Decode`]
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self, target: &str) -> Result<Finding, SessionError> {
        let target = target.trim().trim_start_matches('@');
        if target.is_empty() {
            return Err(SessionError::profile_not_found(target));
        }

        let user = self.profile_info(target).await?;

        let bio = user.biography.filter(|b| !b.trim().is_empty());
        let bio_text = bio.as_deref().unwrap_or_default();
        let (mut emails, mut phones) = extract_contacts(bio_text);

        match self.contact_hint(target).await {
            Ok(hint) => {
                if let Some(email) = hint.email.filter(|e| !e.is_empty())
                    && !emails.contains(&email)
                {
                    emails.push(email);
                }
                if let Some(phone) = hint.phone.filter(|p| !p.is_empty())
                    && !phones.contains(&phone)
                {
                    phones.push(phone);
                }
            }
            Err(e) => warn!(error = %e, "contact hint lookup failed"),
        }

        let mut finding = Finding::new(
            INSTAGRAM_PLATFORM,
            format!("https://instagram.com/{}", user.username),
            user.username,
        );
        finding.full_name = user.full_name.filter(|n| !n.trim().is_empty());
        finding.location = detect_location(bio_text).map(str::to_string);
        finding.bio = bio;
        finding.emails = emails;
        finding.phones = phones;
        finding.followers = user.edge_followed_by.map(|e| e.count);
        finding.following = user.edge_follow.map(|e| e.count);
        finding.posts = user.edge_owner_to_timeline_media.map(|e| e.count);
        finding.profile_pic_url = user.profile_pic_url_hd.or(user.profile_pic_url);

        info!(username = %finding.username, "fetched session profile");
        Ok(finding)
    }

    /// Asks the password-recovery flow for masked contact details.
    ///
    /// A non-success status yields an empty hint, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Network`] or [`SessionError::Decode`] if the
    /// request fails or the success body is not the expected JSON.
    #[instrument(skip(self))]
    pub async fn contact_hint(&self, target: &str) -> Result<ContactHint, SessionError> {
        let url = InstagramEndpoints::join(&self.endpoints.web_base, RECOVERY_PATH)?;
        let referer = InstagramEndpoints::join(&self.endpoints.web_base, PASSWORD_RESET_PATH)?;

        let response = self
            .client
            .post(url.clone())
            .header(USER_AGENT, random_user_agent())
            .header("X-CSRFToken", self.csrf_token.as_deref().unwrap_or_default())
            .header(REFERER, referer.as_str())
            .form(&[("email_or_username", target)])
            .send()
            .await
            .map_err(|e| SessionError::network(url.as_str(), e))?;

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "no contact hint");
            return Ok(ContactHint::default());
        }

        decode_json(response, &url).await
    }

    async fn profile_info(&self, target: &str) -> Result<ProfileUser, SessionError> {
        let mut url = InstagramEndpoints::join(&self.endpoints.api_base, PROFILE_INFO_PATH)?;
        url.query_pairs_mut().append_pair("username", target);

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, random_user_agent())
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header("X-IG-App-ID", IG_APP_ID)
            .send()
            .await
            .map_err(|e| SessionError::network(url.as_str(), e))?;

        let status = response.status().as_u16();
        if matches!(status, 401 | 403) {
            return Err(SessionError::session_invalid(format!("HTTP {status}")));
        }
        if response.url().path().starts_with(LOGIN_PATH) {
            return Err(SessionError::session_invalid("redirected to login"));
        }
        if status == 404 {
            return Err(SessionError::profile_not_found(target));
        }
        if !response.status().is_success() {
            return Err(SessionError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let body: ProfileInfoResponse = decode_json(response, &url).await?;
        body.data
            .and_then(|data| data.user)
            .ok_or_else(|| SessionError::profile_not_found(target))
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: Response,
    url: &Url,
) -> Result<T, SessionError> {
    let text = response
        .text()
        .await
        .map_err(|e| SessionError::network(url.as_str(), e))?;
    serde_json::from_str(&text).map_err(|source| SessionError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Returns the first known place named in `bio` as a whole word.
#[must_use]
pub fn detect_location(bio: &str) -> Option<&'static str> {
    LOCATION_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(bio))
        .map(|(keyword, _)| *keyword)
}
