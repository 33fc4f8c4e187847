use crate::error::Result;
use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; WebCrawler/1.0)";

/// Retrieves the HTML body of a single page.
///
/// Implementations fold every failure into `None`; the crawler neither
/// distinguishes failure reasons nor retries.
pub trait PageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<String>>;
}

/// [`PageFetcher`] backed by a reqwest client with a fixed timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_html(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Fetch failed for {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!("Skipping {}: status {}", url, status);
            return None;
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_lowercase().contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            debug!("Skipping {}: not text/html", url);
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(self.fetch_html(url))
    }
}
