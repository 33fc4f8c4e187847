pub mod canonical;
pub mod classify;
pub mod crawler;
pub mod depth;
pub mod error;
pub mod fetcher;
pub mod graph;
pub mod result;
pub mod sitemap;

pub use canonical::canonicalize;
pub use classify::{LinkDenylist, domain_of, is_internal, is_valid};
pub use crawler::{Crawler, CrawlerConfig, ProgressCallback};
pub use depth::{Depth, DepthMap, resolve};
pub use error::ScanError;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use graph::{CrawlGraph, LinkEdge};
pub use result::CrawlOutcome;
pub use sitemap::{HttpSitemapSource, SitemapSource};
