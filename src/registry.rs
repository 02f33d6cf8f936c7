//! Known platform domains and hostname-based platform lookup.
//!
//! The registry is the fixed list of domains a scan probes. Lookup is a
//! substring match of the registered domain against a URL's host, in
//! registration order.

use url::Url;

/// Platform name returned when no registered domain matches a host.
pub const UNKNOWN_PLATFORM: &str = "Unknown";

/// A registered platform: the hostname substring and its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Hostname (or hostname substring) used to build and match URLs.
    pub domain: &'static str,
    /// Human-readable platform name.
    pub name: &'static str,
}

const fn platform(domain: &'static str, name: &'static str) -> Platform {
    Platform { domain, name }
}

const BUILTIN_PLATFORMS: &[Platform] = &[
    // General social networks
    platform("facebook.com", "Facebook"),
    platform("twitter.com", "Twitter"),
    platform("instagram.com", "Instagram"),
    platform("linkedin.com", "LinkedIn"),
    platform("tiktok.com", "TikTok"),
    platform("snapchat.com", "Snapchat"),
    platform("pinterest.com", "Pinterest"),
    platform("reddit.com", "Reddit"),
    platform("tumblr.com", "Tumblr"),
    platform("vk.com", "VK"),
    platform("weibo.com", "Weibo"),
    platform("mastodon.social", "Mastodon"),
    platform("telegram.me", "Telegram"),
    platform("t.me", "Telegram"),
    platform("discord.com", "Discord"),
    // Creator platforms
    platform("youtube.com", "YouTube"),
    platform("vimeo.com", "Vimeo"),
    platform("twitch.tv", "Twitch"),
    platform("soundcloud.com", "SoundCloud"),
    platform("bandcamp.com", "Bandcamp"),
    platform("mixcloud.com", "Mixcloud"),
    platform("patreon.com", "Patreon"),
    platform("ko-fi.com", "Ko-fi"),
    // Professional and knowledge
    platform("stackoverflow.com", "StackOverflow"),
    platform("medium.com", "Medium"),
    platform("quora.com", "Quora"),
    platform("github.com", "GitHub"),
    platform("gitlab.com", "GitLab"),
    platform("bitbucket.org", "Bitbucket"),
    platform("researchgate.net", "ResearchGate"),
    platform("academia.edu", "Academia"),
    // Reviews and interests
    platform("goodreads.com", "Goodreads"),
    platform("letterboxd.com", "Letterboxd"),
    platform("behance.net", "Behance"),
    platform("dribbble.com", "Dribbble"),
    platform("deviantart.com", "DeviantArt"),
    platform("flickr.com", "Flickr"),
    // Marketplaces
    platform("etsy.com", "Etsy"),
    platform("ebay.com", "eBay"),
    platform("tiktokshop.com", "TikTok Shop"),
    // Forums and communities
    platform("4chan.org", "4chan"),
    platform("8kun.top", "8kun"),
    platform("forums.whirlpool.net.au", "Whirlpool"),
    platform("vbulletin.com", "vBulletin"),
    platform("discourse.org", "Discourse"),
];

/// Ordered set of platforms probed by a scan.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    platforms: Vec<Platform>,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DomainRegistry {
    /// Returns the built-in registry of known platforms.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            platforms: BUILTIN_PLATFORMS.to_vec(),
        }
    }

    /// Builds a registry from explicit entries, dropping repeated domains.
    #[must_use]
    pub fn from_platforms(platforms: impl IntoIterator<Item = Platform>) -> Self {
        let mut unique: Vec<Platform> = Vec::new();
        for entry in platforms {
            if !unique.iter().any(|p| p.domain == entry.domain) {
                unique.push(entry);
            }
        }
        Self { platforms: unique }
    }

    /// Number of registered domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Returns true when no domains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Iterates registered platforms in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    /// Returns the platform name for a URL, or [`UNKNOWN_PLATFORM`].
    ///
    /// The first registered domain contained in the lowercased host wins.
    #[must_use]
    pub fn platform_for_url(&self, url: &str) -> &'static str {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        else {
            return UNKNOWN_PLATFORM;
        };

        self.platforms
            .iter()
            .find(|p| host.contains(p.domain))
            .map_or(UNKNOWN_PLATFORM, |p| p.name)
    }
}
