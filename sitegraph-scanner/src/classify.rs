//! Link classification: which discovered links are allowed into the frontier.

use crate::canonical::strip_www;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static DEFAULT_DENYLIST: LazyLock<LinkDenylist> = LazyLock::new(LinkDenylist::default);

/// Patterns that exclude a link from the crawl.
///
/// All matching is done against the lowercased URL. Fields missing from a
/// deserialized config fall back to the built-in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkDenylist {
    /// Pseudo-protocols that never lead to a crawlable page.
    pub schemes: Vec<String>,
    /// File extensions of binary or non-HTML resources.
    pub extensions: Vec<String>,
    /// Substrings for tracking parameters, social networks and boilerplate paths.
    pub keywords: Vec<String>,
}

impl Default for LinkDenylist {
    fn default() -> Self {
        Self {
            schemes: to_owned(&["mailto:", "tel:", "javascript:"]),
            extensions: to_owned(&[
                ".pdf", ".jpg", ".jpeg", ".png", ".css", ".js", ".svg", ".ico", ".webp", ".mp4",
                ".avi", ".mov", ".zip", ".rar", ".json", ".xml",
            ]),
            keywords: to_owned(&[
                "cookie",
                "privacy",
                "terms",
                "policy",
                "facebook",
                "twitter",
                "linkedin",
                "instagram",
                "tiktok",
                "pinterest",
                "utm_",
                "tagmanager",
                "wp-content",
                "wp-json",
                "wp-admin",
                "wp-includes",
                "administrator",
                "components",
                "media",
                "modules",
                "themes",
                "feed",
                "login",
                "logout",
                "signup",
                "register",
                "account",
            ]),
        }
    }
}

impl LinkDenylist {
    /// Returns false when the link matches any excluded scheme, extension or keyword.
    pub fn allows(&self, url: &str) -> bool {
        let url = url.to_lowercase();

        if self.schemes.iter().any(|scheme| url.starts_with(scheme.as_str())) {
            return false;
        }
        if self.extensions.iter().any(|ext| url.ends_with(ext.as_str())) {
            return false;
        }
        !self.keywords.iter().any(|keyword| url.contains(keyword.as_str()))
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The comparable domain of a URL: lowercased `host[:port]` without a leading
/// `www.`. Relative or unparseable URLs have an empty domain.
pub fn domain_of(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let host = host.to_lowercase();
    let host = strip_www(&host).unwrap_or(&host);
    match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// True when the link stays on the seed's domain. Links without a host are
/// relative and inherit the current page's domain.
pub fn is_internal(url: &str, seed_domain: &str) -> bool {
    let domain = domain_of(url);
    domain.is_empty() || domain == seed_domain
}

/// [`LinkDenylist::allows`] with the built-in lists.
pub fn is_valid(url: &str) -> bool {
    DEFAULT_DENYLIST.allows(url)
}
