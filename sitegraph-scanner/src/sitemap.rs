use crate::error::Result;
use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Supplies the list of URLs a site declares in its sitemap.
///
/// Implementations never fail: any problem yields an empty list.
pub trait SitemapSource: Send + Sync {
    fn fetch_sitemap<'a>(&'a self, start_url: &'a str) -> BoxFuture<'a, Vec<String>>;
}

/// Reads `<scheme>://<host>/sitemap.xml` over HTTP.
#[derive(Clone)]
pub struct HttpSitemapSource {
    client: Client,
}

impl HttpSitemapSource {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn load(&self, start_url: &str) -> Vec<String> {
        let Some(sitemap_url) = sitemap_url_for(start_url) else {
            warn!("Cannot derive sitemap location from {}", start_url);
            return Vec::new();
        };

        let response = match self.client.get(&sitemap_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to read sitemap {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            info!("No sitemap at {} (status {})", sitemap_url, response.status());
            return Vec::new();
        }

        let is_xml = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_lowercase().contains("xml"))
            .unwrap_or(false);
        if !is_xml {
            info!("No sitemap at {} (not XML)", sitemap_url);
            return Vec::new();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read sitemap {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        let urls = parse_sitemap(&body);
        info!("Sitemap {} lists {} URLs", sitemap_url, urls.len());
        urls
    }
}

impl SitemapSource for HttpSitemapSource {
    fn fetch_sitemap<'a>(&'a self, start_url: &'a str) -> BoxFuture<'a, Vec<String>> {
        Box::pin(self.load(start_url))
    }
}

/// `<scheme>://<host>[:port]/sitemap.xml` for the site hosting `start_url`.
pub fn sitemap_url_for(start_url: &str) -> Option<String> {
    let parsed = Url::parse(start_url).ok()?;
    parsed.host_str()?;
    parsed.join("/sitemap.xml").ok().map(|url| url.to_string())
}

/// Extract the `<loc>` values of a sitemap (or sitemap index) document.
///
/// Only `loc` elements in the standard sitemap namespace count, whether it is
/// declared as the default namespace or bound to a prefix (`<sm:loc>`).
pub fn parse_sitemap(xml: &str) -> Vec<String> {
    let tags = loc_tags(xml);
    if tags.is_empty() {
        debug!("Sitemap document does not declare the sitemap namespace");
        return Vec::new();
    }

    let mut urls = Vec::new();
    let mut start = 0usize;
    while let Some(lt) = xml[start..].find('<') {
        let tag_start = start + lt + 1;
        let rest = &xml[tag_start..];
        let Some(gt) = rest.find('>') else {
            break;
        };
        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(gt);
        let name = &rest[..name_end];
        let content_start = tag_start + gt + 1;
        start = content_start;

        if rest[..gt].ends_with('/') || !tags.iter().any(|tag| tag == name) {
            continue;
        }

        let close_tag = format!("</{}>", name);
        let Some(close_rel) = xml[content_start..].find(&close_tag) else {
            break;
        };
        let close = content_start + close_rel;
        let value = unescape(strip_cdata(xml[content_start..close].trim()));
        if !value.is_empty() {
            urls.push(value);
        }
        start = close + close_tag.len();
    }
    urls
}

/// Qualified names `loc` can appear under: `loc` when the sitemap namespace is
/// the default, `prefix:loc` for each prefix bound to it.
fn loc_tags(xml: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut start = 0usize;
    while let Some(idx) = xml[start..].find("xmlns") {
        start += idx + "xmlns".len();
        let decl = &xml[start..];
        let Some(eq) = decl.find('=') else {
            break;
        };
        let prefix = decl[..eq].trim();
        let value = decl[eq + 1..].trim_start();
        let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(end) = value[1..].find(quote) else {
            continue;
        };
        if &value[1..1 + end] != SITEMAP_NAMESPACE {
            continue;
        }

        match prefix.strip_prefix(':') {
            None if prefix.is_empty() => tags.push("loc".to_string()),
            Some(name) if !name.is_empty() => tags.push(format!("{}:loc", name)),
            _ => {}
        }
    }
    tags
}

fn strip_cdata(value: &str) -> &str {
    value
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
        .map(str::trim)
        .unwrap_or(value)
}

/// Resolve the predefined XML entities and numeric character references.
/// Anything unrecognised is kept verbatim.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let reference = entity.strip_prefix('#')?;
            let code = match reference.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => reference.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
