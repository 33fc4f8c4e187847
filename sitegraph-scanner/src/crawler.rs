use crate::canonical::canonicalize;
use crate::classify::{LinkDenylist, domain_of, is_internal};
use crate::depth::{reconcile_sitemap, resolve};
use crate::error::Result;
use crate::fetcher::{DEFAULT_USER_AGENT, HttpFetcher, PageFetcher};
use crate::graph::CrawlGraph;
use crate::result::CrawlOutcome;
use crate::sitemap::{HttpSitemapSource, SitemapSource};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pages deeper than this (in discovery order) are never fetched.
    pub max_depth: usize,
    /// Size of the worker pool.
    pub workers: usize,
    pub timeout_secs: u64,
    pub sitemap_timeout_secs: u64,
    /// Overall limit for one run; the graph built so far is returned when it expires.
    pub deadline_secs: Option<u64>,
    pub user_agent: String,
    pub denylist: LinkDenylist,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            workers: 10,
            timeout_secs: 8,
            sitemap_timeout_secs: 5,
            deadline_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            denylist: LinkDenylist::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierItem {
    url: String,
    depth: usize,
}

/// Everything the workers share. Guarded by a single lock so that the
/// visited check and the visited mark happen together.
#[derive(Default)]
struct CrawlState {
    frontier: VecDeque<FrontierItem>,
    visited: HashSet<String>,
    graph: CrawlGraph,
    in_flight: usize,
    pages_fetched: usize,
}

enum Dispatch {
    Fetch(FrontierItem),
    /// Frontier empty but other workers may still enqueue links.
    Wait,
    Done,
}

impl CrawlState {
    fn next_item(&mut self, max_depth: usize) -> Dispatch {
        while let Some(item) = self.frontier.pop_front() {
            if item.depth > max_depth {
                debug!("Skipping {} at depth {} (max {})", item.url, item.depth, max_depth);
                continue;
            }
            if !self.visited.insert(item.url.clone()) {
                continue;
            }
            self.in_flight += 1;
            return Dispatch::Fetch(item);
        }

        if self.in_flight == 0 {
            Dispatch::Done
        } else {
            Dispatch::Wait
        }
    }
}

pub struct Crawler {
    config: CrawlerConfig,
    fetcher: Arc<dyn PageFetcher>,
    sitemap_source: Arc<dyn SitemapSource>,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::from_config(CrawlerConfig::default())
    }

    /// Crawler using HTTP for pages and the sitemap.
    pub fn from_config(config: CrawlerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout_secs, &config.user_agent)?;
        let sitemap_source =
            HttpSitemapSource::new(config.sitemap_timeout_secs, &config.user_agent)?;
        Ok(Self::with_components(
            config,
            Arc::new(fetcher),
            Arc::new(sitemap_source),
        ))
    }

    pub fn with_components(
        config: CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
        sitemap_source: Arc<dyn SitemapSource>,
    ) -> Self {
        Self {
            config,
            fetcher,
            sitemap_source,
            progress_callback: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn with_denylist(mut self, denylist: LinkDenylist) -> Self {
        self.config.denylist = denylist;
        self
    }

    pub fn with_deadline(mut self, secs: u64) -> Self {
        self.config.deadline_secs = Some(secs);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_sitemap_source(mut self, sitemap_source: Arc<dyn SitemapSource>) -> Self {
        self.sitemap_source = sitemap_source;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Stop dispatching fetches once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawl from `start_url`, resolve depths and reconcile against the sitemap.
    ///
    /// Never fails: unreachable pages, bad input and cancellation all produce a
    /// (possibly partial) graph.
    pub async fn crawl(&self, start_url: &str) -> CrawlOutcome {
        let seed = canonicalize(start_url);
        let seed_domain = domain_of(&seed);
        let workers = self.config.workers.max(1);
        info!(
            "Starting crawl of {} with {} workers (max depth {})",
            seed, workers, self.config.max_depth
        );

        let cancel = self.cancel.child_token();
        let deadline = self.config.deadline_secs.map(|secs| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                info!("Crawl deadline of {}s reached", secs);
                cancel.cancel();
            })
        });

        let mut state = CrawlState::default();
        state.graph.add_node(&seed);
        state.frontier.push_back(FrontierItem {
            url: seed.clone(),
            depth: 0,
        });
        let state = Arc::new(Mutex::new(state));

        let worker = Worker {
            state: state.clone(),
            wake: Arc::new(Notify::new()),
            fetcher: self.fetcher.clone(),
            denylist: Arc::new(self.config.denylist.clone()),
            seed_domain: seed_domain.into(),
            max_depth: self.config.max_depth,
            progress_callback: self.progress_callback.clone(),
            cancel: cancel.clone(),
        };

        let worker_handles: Vec<_> = (0..workers)
            .map(|worker_id| tokio::spawn(worker.clone().run(worker_id)))
            .collect();
        drop(worker);

        for handle in worker_handles {
            if let Err(e) = handle.await {
                warn!("Worker task failed: {}", e);
            }
        }

        let (mut graph, pages_fetched) = {
            let mut state = state.lock().await;
            (std::mem::take(&mut state.graph), state.pages_fetched)
        };

        let sitemap_urls = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Crawl cancelled, skipping sitemap");
                Vec::new()
            }
            urls = self.sitemap_source.fetch_sitemap(start_url) => urls,
        };

        if let Some(handle) = deadline {
            handle.abort();
        }
        let cancelled = cancel.is_cancelled();

        let added = reconcile_sitemap(&mut graph, &sitemap_urls);
        let depths = resolve(&graph, &seed);

        info!(
            "Crawl complete. Fetched {} pages, {} nodes ({} from sitemap only), {} edges",
            pages_fetched,
            graph.node_count(),
            added,
            graph.edge_count()
        );

        CrawlOutcome {
            seed,
            max_depth: self.config.max_depth,
            graph,
            depths,
            sitemap_urls,
            pages_fetched,
            cancelled,
        }
    }
}

#[derive(Clone)]
struct Worker {
    state: Arc<Mutex<CrawlState>>,
    wake: Arc<Notify>,
    fetcher: Arc<dyn PageFetcher>,
    denylist: Arc<LinkDenylist>,
    seed_domain: Arc<str>,
    max_depth: usize,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self, worker_id: usize) {
        debug!("Worker {} started", worker_id);

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            // Registered before inspecting the frontier so a wakeup sent
            // between the check and the wait is not lost.
            let wake = self.wake.notified();
            let dispatch = {
                let mut state = self.state.lock().await;
                state.next_item(self.max_depth)
            };

            match dispatch {
                Dispatch::Fetch(item) => self.expand(worker_id, item).await,
                Dispatch::Wait => {
                    tokio::select! {
                        _ = wake => {}
                        _ = self.cancel.cancelled() => break,
                    }
                }
                Dispatch::Done => {
                    self.wake.notify_waiters();
                    break;
                }
            }
        }

        debug!("Worker {} finished", worker_id);
    }

    /// Fetch one page and feed its in-scope links back into the frontier.
    async fn expand(&self, worker_id: usize, item: FrontierItem) {
        if let Some(ref callback) = self.progress_callback {
            callback(worker_id, item.url.clone());
        }
        debug!("[Worker {}] Fetching {} (depth {})", worker_id, item.url, item.depth);

        // Runs in its own task so a fault while fetching or parsing only
        // loses this page.
        let fetcher = self.fetcher.clone();
        let url = item.url.clone();
        let mut task = tokio::spawn(async move {
            let html = fetcher.fetch(&url).await?;
            Some(extract_links(&html, &url))
        });

        let links = tokio::select! {
            joined = &mut task => match joined {
                Ok(links) => links,
                Err(e) => {
                    warn!("Expanding {} failed: {}", item.url, e);
                    None
                }
            },
            _ = self.cancel.cancelled() => None,
        };
        task.abort();

        let mut state = self.state.lock().await;
        state.in_flight -= 1;

        match links {
            Some(links) => {
                state.pages_fetched += 1;
                for (target, label) in links {
                    if !is_internal(&target, &self.seed_domain) {
                        debug!("  -> {} is external, skipping", target);
                        continue;
                    }
                    if !self.denylist.allows(&target) {
                        debug!("  -> {} is excluded, skipping", target);
                        continue;
                    }

                    state.graph.add_edge(&item.url, &target, &label);
                    if !state.visited.contains(&target) {
                        state.frontier.push_back(FrontierItem {
                            url: target,
                            depth: item.depth + 1,
                        });
                    }
                }
            }
            None => debug!("No content for {}", item.url),
        }

        drop(state);
        self.wake.notify_waiters();
    }
}

/// Every anchor of `html` as (canonical absolute URL, anchor text), resolved
/// against the URL of the page it was found on.
pub fn extract_links(html: &str, page_url: &str) -> Vec<(String, String)> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }

            let absolute = base
                .as_ref()
                .and_then(|base| base.join(href).ok())
                .map(|url| url.to_string())
                .unwrap_or_else(|| href.to_string());
            let label: String = element
                .text()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .collect();

            Some((canonicalize(&absolute), label))
        })
        .collect()
}
