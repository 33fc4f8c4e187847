pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{build_config, depth_band, parse_url_line, report_format};

// Re-export crawl functionality from sitegraph-core
pub use sitegraph_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path};
