use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Directed link between two canonical URLs, labelled with the anchor text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub label: &'a str,
}

/// Node and edge set accumulated by a crawl.
///
/// Edges are keyed by the ordered (source, target) pair, so inserting the same
/// pair twice keeps one edge with the last label. A reverse index makes
/// reciprocity and in-degree lookups cheap. Iteration order is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlGraph {
    nodes: BTreeSet<String>,
    outgoing: BTreeMap<String, BTreeMap<String, String>>,
    incoming: BTreeMap<String, BTreeSet<String>>,
}

impl CrawlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the node was not present before.
    pub fn add_node(&mut self, url: &str) -> bool {
        if self.nodes.contains(url) {
            return false;
        }
        self.nodes.insert(url.to_string())
    }

    /// Insert or relabel the edge `source -> target`. Both endpoints become nodes.
    pub fn add_edge(&mut self, source: &str, target: &str, label: &str) {
        self.add_node(source);
        self.add_node(target);
        self.outgoing
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string(), label.to_string());
        self.incoming
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string());
    }

    pub fn contains(&self, url: &str) -> bool {
        self.nodes.contains(url)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.outgoing
            .get(source)
            .is_some_and(|targets| targets.contains_key(target))
    }

    pub fn label(&self, source: &str, target: &str) -> Option<&str> {
        self.outgoing
            .get(source)
            .and_then(|targets| targets.get(target))
            .map(String::as_str)
    }

    /// True when both `source -> target` and `target -> source` exist.
    pub fn is_reciprocal(&self, source: &str, target: &str) -> bool {
        self.has_edge(source, target) && self.has_edge(target, source)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = LinkEdge<'_>> {
        self.outgoing.iter().flat_map(|(source, targets)| {
            targets.iter().map(move |(target, label)| LinkEdge {
                source,
                target,
                label,
            })
        })
    }

    pub fn successors(&self, url: &str) -> impl Iterator<Item = &str> {
        self.outgoing
            .get(url)
            .into_iter()
            .flat_map(|targets| targets.keys().map(String::as_str))
    }

    pub fn predecessors(&self, url: &str) -> impl Iterator<Item = &str> {
        self.incoming
            .get(url)
            .into_iter()
            .flat_map(|sources| sources.iter().map(String::as_str))
    }

    pub fn out_degree(&self, url: &str) -> usize {
        self.outgoing.get(url).map_or(0, BTreeMap::len)
    }

    pub fn in_degree(&self, url: &str) -> usize {
        self.incoming.get(url).map_or(0, BTreeSet::len)
    }

    /// In-degree plus out-degree; a self-link counts twice.
    pub fn degree(&self, url: &str) -> usize {
        self.in_degree(url) + self.out_degree(url)
    }

    pub fn is_isolated(&self, url: &str) -> bool {
        self.contains(url) && self.degree(url) == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
