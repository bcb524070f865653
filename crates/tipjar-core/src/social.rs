//! Social link classification for profile pages.
//!
//! Known hosts get a platform name and, when the URL is a plain profile
//! URL, the username as label. Anything else, including URLs that do not
//! parse, renders as a generic website link.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X,
    Twitter,
    GitHub,
    LinkedIn,
    Instagram,
    Facebook,
    YouTube,
    TikTok,
    Twitch,
    Website,
}

impl Platform {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Twitter => "Twitter",
            Self::GitHub => "GitHub",
            Self::LinkedIn => "LinkedIn",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Twitch => "Twitch",
            Self::Website => "Website",
        }
    }
}

struct PlatformRule {
    domain: &'static str,
    platform: Platform,
    username: Regex,
}

fn rule(domain: &'static str, platform: Platform, pattern: &str) -> PlatformRule {
    PlatformRule {
        domain,
        platform,
        username: Regex::new(pattern).expect("static social link pattern"),
    }
}

static RULES: Lazy<Vec<PlatformRule>> = Lazy::new(|| {
    vec![
        rule("x.com", Platform::X, r"^https?://(www\.)?x\.com/([a-zA-Z0-9_]+)/?$"),
        rule(
            "twitter.com",
            Platform::Twitter,
            r"^https?://(www\.)?twitter\.com/([a-zA-Z0-9_]+)/?$",
        ),
        rule(
            "github.com",
            Platform::GitHub,
            r"^https?://(www\.)?github\.com/([a-zA-Z0-9-]+)/?$",
        ),
        rule(
            "linkedin.com",
            Platform::LinkedIn,
            r"^https?://(www\.)?linkedin\.com/in/([a-zA-Z0-9-]+)/?$",
        ),
        rule(
            "instagram.com",
            Platform::Instagram,
            r"^https?://(www\.)?instagram\.com/([a-zA-Z0-9._]+)/?$",
        ),
        rule(
            "facebook.com",
            Platform::Facebook,
            r"^https?://(www\.)?facebook\.com/([a-zA-Z0-9.]+)/?$",
        ),
        rule(
            "youtube.com",
            Platform::YouTube,
            r"^https?://(www\.)?youtube\.com/(user|c|channel)/([a-zA-Z0-9_-]+)/?$",
        ),
        rule(
            "tiktok.com",
            Platform::TikTok,
            r"^https?://(www\.)?tiktok\.com/@([a-zA-Z0-9._]+)/?$",
        ),
        rule(
            "twitch.tv",
            Platform::Twitch,
            r"^https?://(www\.)?twitch\.tv/([a-zA-Z0-9_]+)/?$",
        ),
    ]
});

static URL_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://([^/?#@\s:]+)(:\d+)?([/?#]\S*)?$")
        .expect("static url pattern")
});

/// A classified social link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub url: String,
    pub platform: Platform,
    /// Username when recognized, otherwise the platform name.
    pub label: String,
}

impl SocialLink {
    pub fn classify(url: &str) -> Self {
        let fallback = || Self {
            url: url.to_string(),
            platform: Platform::Website,
            label: Platform::Website.display_name().to_string(),
        };

        let Some(host) = URL_HOST.captures(url).and_then(|c| c.get(1)) else {
            tracing::debug!("invalid social link url: {}", url);
            return fallback();
        };
        let host = host.as_str().to_ascii_lowercase();
        let domain = host.strip_prefix("www.").unwrap_or(&host);

        let Some(rule) = RULES.iter().find(|rule| domain.contains(rule.domain)) else {
            return fallback();
        };

        let label = rule
            .username
            .captures(url)
            .and_then(|c| c.iter().flatten().last())
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| rule.platform.display_name().to_string());

        Self {
            url: url.to_string(),
            platform: rule.platform,
            label,
        }
    }
}

/// Classifies the non-blank links, preserving order.
pub fn classify_links(links: &[String]) -> Vec<SocialLink> {
    links
        .iter()
        .filter(|link| !link.trim().is_empty())
        .map(|link| SocialLink::classify(link))
        .collect()
}
