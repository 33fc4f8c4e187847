//! Read-only projections of a crawl outcome for presentation layers.

use serde::Serialize;
use sitegraph_scanner::{CrawlOutcome, Depth};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewNode {
    pub url: String,
    pub depth: Depth,
    pub in_degree: usize,
    pub out_degree: usize,
    pub in_sitemap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    /// The target links back to the source.
    pub reciprocal: bool,
}

/// Nodes and edges of a crawl, optionally restricted to a depth band.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphView {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

impl GraphView {
    /// Every node, unreachable ones included.
    pub fn full(outcome: &CrawlOutcome) -> Self {
        Self::build(outcome, |_| true)
    }

    /// Nodes whose depth lies in `min_depth..=max_depth` and the edges between
    /// them. Unreachable nodes never match.
    pub fn filtered(outcome: &CrawlOutcome, min_depth: usize, max_depth: usize) -> Self {
        Self::build(outcome, |depth| {
            depth
                .level()
                .is_some_and(|level| (min_depth..=max_depth).contains(&level))
        })
    }

    fn build(outcome: &CrawlOutcome, keep: impl Fn(Depth) -> bool) -> Self {
        let graph = &outcome.graph;
        let sitemap = outcome.canonical_sitemap_urls();

        let nodes: Vec<ViewNode> = graph
            .nodes()
            .filter(|url| keep(outcome.depth_of(url)))
            .map(|url| ViewNode {
                url: url.to_string(),
                depth: outcome.depth_of(url),
                in_degree: graph.in_degree(url),
                out_degree: graph.out_degree(url),
                in_sitemap: sitemap.contains(url),
            })
            .collect();

        let included: BTreeSet<&str> = nodes.iter().map(|node| node.url.as_str()).collect();
        let edges = graph
            .edges()
            .filter(|edge| included.contains(edge.source) && included.contains(edge.target))
            .map(|edge| ViewEdge {
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                label: edge.label.to_string(),
                reciprocal: graph.is_reciprocal(edge.source, edge.target),
            })
            .collect();

        Self { nodes, edges }
    }

    /// Unordered pairs of pages linking to each other (self-links excluded).
    pub fn reciprocal_pairs(&self) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.reciprocal && edge.source < edge.target)
            .count()
    }
}

/// How the crawl lines up with the site's sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SitemapSummary {
    /// Distinct canonical URLs in the sitemap.
    pub total: usize,
    /// Sitemap pages with no incoming or outgoing link in the crawl graph.
    pub orphaned: Vec<String>,
    /// Sitemap pages with no link path from the seed.
    pub unreachable: Vec<String>,
    /// Reachable crawled pages the sitemap does not list.
    pub not_in_sitemap: Vec<String>,
}

impl SitemapSummary {
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        let sitemap = outcome.canonical_sitemap_urls();
        let graph = &outcome.graph;

        let orphaned = sitemap
            .iter()
            .filter(|url| graph.is_isolated(url))
            .cloned()
            .collect();
        let unreachable = sitemap
            .iter()
            .filter(|url| !outcome.depth_of(url).is_reachable())
            .cloned()
            .collect();
        let not_in_sitemap = if sitemap.is_empty() {
            Vec::new()
        } else {
            graph
                .nodes()
                .filter(|url| outcome.depth_of(url).is_reachable() && !sitemap.contains(*url))
                .map(str::to_string)
                .collect()
        };

        Self {
            total: sitemap.len(),
            orphaned,
            unreachable,
            not_in_sitemap,
        }
    }
}
