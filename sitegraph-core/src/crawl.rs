use indicatif::{ProgressBar, ProgressStyle};
use sitegraph_scanner::error::Result;
use sitegraph_scanner::{CrawlOutcome, Crawler, CrawlerConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub url: String,
    pub config: CrawlerConfig,
    pub show_progress_bars: bool,
    /// Cancelling this token stops the crawl and keeps what was found so far.
    pub cancel: CancellationToken,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>, config: CrawlerConfig) -> Self {
        Self {
            url: url.into(),
            config,
            show_progress_bars: false,
            cancel: CancellationToken::new(),
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlOutcome> {
    let CrawlOptions {
        url,
        config,
        show_progress_bars,
        cancel,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let count_clone = processed_count.clone();
    let pb_clone = progress_bar.clone();
    let worker_progress: sitegraph_scanner::ProgressCallback =
        Arc::new(move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!(
                    "Crawling... {} pages fetched ({})",
                    count,
                    extract_url_path(&url)
                ));
            }
        });

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Crawling {} (max depth {}, {} workers)",
            url, config.max_depth, config.workers
        ));
    }

    let crawler = Crawler::from_config(config)?
        .with_progress_callback(worker_progress)
        .with_cancellation(cancel);
    let outcome = crawler.crawl(&url).await;

    let total = processed_count.load(Ordering::Relaxed);
    if let Some(ref pb) = progress_bar {
        if outcome.cancelled {
            pb.finish_with_message(format!("Crawl stopped early. {} URLs processed", total));
        } else {
            pb.finish_with_message(format!("Crawl complete! {} URLs processed", total));
        }
    }

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "{} pages discovered, {} listed in sitemap",
            outcome.graph.node_count(),
            outcome.sitemap_urls.len()
        ));
    }

    Ok(outcome)
}
