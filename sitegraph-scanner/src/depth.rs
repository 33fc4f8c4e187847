//! Shortest-path depth resolution and sitemap reconciliation over a finished
//! crawl graph.

use crate::canonical::canonicalize;
use crate::graph::CrawlGraph;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Distance from the seed, or `Unreachable` when no directed path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Depth {
    Level(usize),
    Unreachable,
}

impl Depth {
    pub fn level(self) -> Option<usize> {
        match self {
            Depth::Level(level) => Some(level),
            Depth::Unreachable => None,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, Depth::Level(_))
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Level(level) => write!(f, "{}", level),
            Depth::Unreachable => write!(f, "unreachable"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DepthMap(BTreeMap<String, Depth>);

impl DepthMap {
    /// Depth of a node. Unknown nodes are unreachable.
    pub fn get(&self, url: &str) -> Depth {
        self.0.get(url).copied().unwrap_or(Depth::Unreachable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Depth)> {
        self.0.iter().map(|(url, depth)| (url.as_str(), *depth))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deepest reachable level, if any node is reachable.
    pub fn max_level(&self) -> Option<usize> {
        self.0.values().filter_map(|depth| depth.level()).max()
    }

    /// Node count per depth, unreachable last.
    pub fn histogram(&self) -> BTreeMap<Depth, usize> {
        let mut counts = BTreeMap::new();
        for depth in self.0.values() {
            *counts.entry(*depth).or_insert(0) += 1;
        }
        counts
    }
}

/// Unweighted single-source shortest paths from the canonicalized seed.
///
/// Every node of `graph` gets an entry; nodes without a directed path from
/// the seed are `Unreachable`. Pure function of its inputs.
pub fn resolve(graph: &CrawlGraph, seed: &str) -> DepthMap {
    let mut depths: BTreeMap<String, Depth> = graph
        .nodes()
        .map(|node| (node.to_string(), Depth::Unreachable))
        .collect();

    let seed = canonicalize(seed);
    if !graph.contains(&seed) {
        return DepthMap(depths);
    }

    let mut queue = VecDeque::new();
    depths.insert(seed.clone(), Depth::Level(0));
    queue.push_back((seed, 0usize));

    while let Some((node, level)) = queue.pop_front() {
        for next in graph.successors(&node) {
            if let Some(depth) = depths.get_mut(next)
                && *depth == Depth::Unreachable
            {
                *depth = Depth::Level(level + 1);
                queue.push_back((next.to_string(), level + 1));
            }
        }
    }

    DepthMap(depths)
}

/// Add every sitemap URL missing from the graph as an isolated node.
///
/// Never adds edges and never fetches anything. Returns the number of nodes
/// added.
pub fn reconcile_sitemap(graph: &mut CrawlGraph, sitemap_urls: &[String]) -> usize {
    sitemap_urls
        .iter()
        .map(|url| canonicalize(url))
        .filter(|url| graph.add_node(url))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> CrawlGraph {
        let mut graph = CrawlGraph::new();
        graph.add_edge("https://example.com/", "https://example.com/a/", "A");
        graph.add_edge("https://example.com/a/", "https://example.com/b/", "B");
        graph.add_edge("https://example.com/", "https://example.com/b/", "B direct");
        graph.add_edge("https://example.com/c/", "https://example.com/", "home");
        graph
    }

    #[test]
    fn test_shortest_path_wins() {
        let depths = resolve(&sample_graph(), "https://example.com");
        assert_eq!(depths.get("https://example.com/"), Depth::Level(0));
        assert_eq!(depths.get("https://example.com/a/"), Depth::Level(1));
        assert_eq!(depths.get("https://example.com/b/"), Depth::Level(1));
    }

    #[test]
    fn test_edges_are_directed() {
        let depths = resolve(&sample_graph(), "https://example.com/");
        assert_eq!(depths.get("https://example.com/c/"), Depth::Unreachable);
    }

    #[test]
    fn test_seed_missing_from_graph() {
        let depths = resolve(&sample_graph(), "https://nowhere.test/");
        assert_eq!(depths.len(), 4);
        assert!(depths.iter().all(|(_, depth)| depth == Depth::Unreachable));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let graph = sample_graph();
        assert_eq!(
            resolve(&graph, "https://example.com/"),
            resolve(&graph, "https://example.com/")
        );
    }

    #[test]
    fn test_reconcile_adds_isolated_nodes_only() {
        let mut graph = sample_graph();
        let edges_before = graph.edge_count();
        let added = reconcile_sitemap(
            &mut graph,
            &[
                "https://www.example.com/a".to_string(),
                "https://example.com/orphan".to_string(),
            ],
        );
        assert_eq!(added, 1);
        assert_eq!(graph.edge_count(), edges_before);
        assert!(graph.is_isolated("https://example.com/orphan/"));

        let depths = resolve(&graph, "https://example.com/");
        assert_eq!(depths.get("https://example.com/orphan/"), Depth::Unreachable);
    }

    #[test]
    fn test_histogram_and_max_level() {
        let depths = resolve(&sample_graph(), "https://example.com/");
        let histogram = depths.histogram();
        assert_eq!(histogram.get(&Depth::Level(0)), Some(&1));
        assert_eq!(histogram.get(&Depth::Level(1)), Some(&2));
        assert_eq!(histogram.get(&Depth::Unreachable), Some(&1));
        assert_eq!(depths.max_level(), Some(1));
    }

    #[test]
    fn test_depth_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Depth::Level(2)).unwrap(), "2");
        assert_eq!(serde_json::to_string(&Depth::Unreachable).unwrap(), "null");
    }
}
