use crate::depth::{Depth, DepthMap};
use crate::graph::CrawlGraph;
use std::collections::BTreeSet;

/// Everything a crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Canonical seed URL.
    pub seed: String,
    pub max_depth: usize,
    pub graph: CrawlGraph,
    pub depths: DepthMap,
    /// Sitemap entries as the site listed them (not canonicalized).
    pub sitemap_urls: Vec<String>,
    /// Pages whose HTML was fetched successfully.
    pub pages_fetched: usize,
    /// The run stopped early on cancellation or deadline.
    pub cancelled: bool,
}

impl CrawlOutcome {
    pub fn depth_of(&self, url: &str) -> Depth {
        self.depths.get(url)
    }

    /// Canonical form of every sitemap entry, deduplicated and sorted.
    pub fn canonical_sitemap_urls(&self) -> BTreeSet<String> {
        self.sitemap_urls
            .iter()
            .map(|url| crate::canonicalize(url))
            .collect()
    }
}
