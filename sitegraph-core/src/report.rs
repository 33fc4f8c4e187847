// Report generation from a crawl outcome

use crate::crawl::extract_url_path;
use crate::view::{GraphView, SitemapSummary, ViewEdge, ViewNode};
use serde::{Deserialize, Serialize};
use sitegraph_scanner::CrawlOutcome;
use sitegraph_scanner::error::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use url::Url;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DepthCount {
    /// `None` for unreachable pages.
    pub depth: Option<usize>,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub seed: String,
    pub max_depth: usize,
    pub generated_at: String,
    pub cancelled: bool,
    pub pages_fetched: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub reciprocal_pairs: usize,
    pub depth_histogram: Vec<DepthCount>,
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
    pub sitemap: SitemapSummary,
}

/// Collect report data. With `depth_band` only pages in that inclusive range
/// (and the links between them) are listed; totals always cover the whole graph.
pub fn gather_report_data(
    outcome: &CrawlOutcome,
    depth_band: Option<(usize, usize)>,
) -> ReportData {
    let view = match depth_band {
        Some((min, max)) => GraphView::filtered(outcome, min, max),
        None => GraphView::full(outcome),
    };
    let reciprocal_pairs = GraphView::full(outcome).reciprocal_pairs();

    let depth_histogram = outcome
        .depths
        .histogram()
        .into_iter()
        .map(|(depth, pages)| DepthCount {
            depth: depth.level(),
            pages,
        })
        .collect();

    ReportData {
        seed: outcome.seed.clone(),
        max_depth: outcome.max_depth,
        generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        cancelled: outcome.cancelled,
        pages_fetched: outcome.pages_fetched,
        total_nodes: outcome.graph.node_count(),
        total_edges: outcome.graph.edge_count(),
        reciprocal_pairs,
        depth_histogram,
        nodes: view.nodes,
        edges: view.edges,
        sitemap: SitemapSummary::from_outcome(outcome),
    }
}

pub fn generate_report(data: &ReportData, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
        ReportFormat::Csv => generate_csv_report(data),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("\n                         SITEGRAPH INTERNAL LINK REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Seed:          {}\n", data.seed));
    report.push_str(&format!("Max depth:     {}\n", data.max_depth));
    report.push_str(&format!("Generated:     {}\n", data.generated_at));
    if data.cancelled {
        report.push_str("Status:        stopped early (partial graph)\n");
    }
    report.push_str(&format!("Pages fetched: {}\n", data.pages_fetched));
    report.push_str(&format!("Pages found:   {}\n", data.total_nodes));
    report.push_str(&format!("Links:         {}\n", data.total_edges));
    report.push_str(&format!("Reciprocal:    {} pairs\n\n", data.reciprocal_pairs));

    report.push_str(RULE);
    report.push_str("\nDEPTH\n");
    report.push_str(RULE);
    report.push_str("\n\n");
    for entry in &data.depth_histogram {
        report.push_str(&format!(
            "  {:<12} {}\n",
            depth_label(entry.depth),
            entry.pages
        ));
    }
    report.push('\n');

    report.push_str(RULE);
    report.push_str("\nPAGES\n");
    report.push_str(RULE);
    report.push_str("\n\n");
    for (host, nodes) in group_by_host(&data.nodes) {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages\n\n", nodes.len()));
        for node in nodes {
            let marker = if node.in_sitemap { " [sitemap]" } else { "" };
            report.push_str(&format!(
                "  [{}] {}  (in {}, out {}){}\n",
                node.depth,
                extract_url_path(&node.url),
                node.in_degree,
                node.out_degree,
                marker
            ));
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push_str("\nSITEMAP\n");
    report.push_str(RULE);
    report.push_str("\n\n");
    if data.sitemap.total == 0 {
        report.push_str("  No sitemap found.\n\n");
    } else {
        report.push_str(&format!("  URLs in sitemap:        {}\n", data.sitemap.total));
        report.push_str(&format!(
            "  Orphaned (no links):    {}\n",
            data.sitemap.orphaned.len()
        ));
        report.push_str(&format!(
            "  Unreachable from seed:  {}\n",
            data.sitemap.unreachable.len()
        ));
        report.push_str(&format!(
            "  Crawled, not listed:    {}\n\n",
            data.sitemap.not_in_sitemap.len()
        ));
        for url in &data.sitemap.orphaned {
            report.push_str(&format!("  orphan  {}\n", url));
        }
        if !data.sitemap.orphaned.is_empty() {
            report.push('\n');
        }
    }

    report.push_str(RULE);
    report.push('\n');
    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitegraph",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": data.generated_at,
            },
            "crawl": {
                "seed": data.seed,
                "max_depth": data.max_depth,
                "cancelled": data.cancelled,
                "pages_fetched": data.pages_fetched,
            },
            "summary": {
                "total_pages": data.total_nodes,
                "total_links": data.total_edges,
                "reciprocal_pairs": data.reciprocal_pairs,
                "depth_histogram": data.depth_histogram,
            },
            "pages": data.nodes,
            "links": data.edges,
            "sitemap": data.sitemap,
        }
    });

    Ok(serde_json::to_string_pretty(&json_report)?)
}

/// One row per link, then one row per page without any link so orphans are
/// not lost.
pub fn generate_csv_report(data: &ReportData) -> Result<String> {
    let nodes: BTreeMap<&str, &ViewNode> = data
        .nodes
        .iter()
        .map(|node| (node.url.as_str(), node))
        .collect();
    let depth_of = |url: &str| {
        nodes
            .get(url)
            .map(|node| node.depth.to_string())
            .unwrap_or_default()
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "source",
            "target",
            "label",
            "reciprocal",
            "source_depth",
            "target_depth",
        ])
        .map_err(io::Error::from)?;

    for edge in &data.edges {
        writer
            .write_record([
                edge.source.clone(),
                edge.target.clone(),
                edge.label.clone(),
                edge.reciprocal.to_string(),
                depth_of(&edge.source),
                depth_of(&edge.target),
            ])
            .map_err(io::Error::from)?;
    }
    for node in data.nodes.iter().filter(|n| n.in_degree == 0 && n.out_degree == 0) {
        writer
            .write_record([
                node.url.clone(),
                String::new(),
                String::new(),
                "false".to_string(),
                node.depth.to_string(),
                String::new(),
            ])
            .map_err(io::Error::from)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes).map_err(io::Error::other)?)
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut md = String::new();

    md.push_str("# Internal link report\n\n");
    md.push_str(&format!("- **Seed:** {}\n", data.seed));
    md.push_str(&format!("- **Max depth:** {}\n", data.max_depth));
    md.push_str(&format!("- **Generated:** {}\n", data.generated_at));
    if data.cancelled {
        md.push_str("- **Status:** stopped early (partial graph)\n");
    }
    md.push_str(&format!("- **Pages found:** {}\n", data.total_nodes));
    md.push_str(&format!("- **Links:** {}\n", data.total_edges));
    md.push_str(&format!("- **Reciprocal pairs:** {}\n\n", data.reciprocal_pairs));

    md.push_str("## Depth\n\n| Depth | Pages |\n|---|---|\n");
    for entry in &data.depth_histogram {
        md.push_str(&format!("| {} | {} |\n", depth_label(entry.depth), entry.pages));
    }

    md.push_str("\n## Pages\n\n| URL | Depth | In | Out | Sitemap |\n|---|---|---|---|---|\n");
    for node in &data.nodes {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            md_escape(&node.url),
            node.depth,
            node.in_degree,
            node.out_degree,
            if node.in_sitemap { "yes" } else { "" }
        ));
    }

    md.push_str("\n## Sitemap\n\n");
    if data.sitemap.total == 0 {
        md.push_str("No sitemap found.\n");
    } else {
        md.push_str(&format!(
            "{} URLs listed, {} orphaned, {} unreachable from the seed.\n",
            data.sitemap.total,
            data.sitemap.orphaned.len(),
            data.sitemap.unreachable.len()
        ));
        if !data.sitemap.orphaned.is_empty() {
            md.push_str("\n### Orphaned pages\n\n");
            for url in &data.sitemap.orphaned {
                md.push_str(&format!("- {}\n", url));
            }
        }
    }

    md
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn depth_label(depth: Option<usize>) -> String {
    depth.map_or_else(|| "unreachable".to_string(), |d| d.to_string())
}

fn group_by_host(nodes: &[ViewNode]) -> BTreeMap<String, Vec<&ViewNode>> {
    let mut by_host: BTreeMap<String, Vec<&ViewNode>> = BTreeMap::new();
    for node in nodes {
        let host = Url::parse(&node.url)
            .ok()
            .and_then(|u| {
                u.host_str().map(|h| match u.port() {
                    Some(port) => format!("{}:{}", h, port),
                    None => h.to_string(),
                })
            })
            .unwrap_or_else(|| "unknown".to_string());
        by_host.entry(host).or_default().push(node);
    }
    by_host
}

fn md_escape(value: &str) -> String {
    value.replace('|', "\\|")
}
