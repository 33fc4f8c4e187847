// Tests for report generation functionality

use sitegraph_core::report::{
    ReportFormat, gather_report_data, generate_csv_report, generate_json_report,
    generate_markdown_report, generate_report, generate_text_report, save_report,
};
use sitegraph_scanner::{CrawlGraph, CrawlOutcome, depth};

fn sample_outcome() -> CrawlOutcome {
    let mut graph = CrawlGraph::new();
    graph.add_node("https://example.com/");
    graph.add_edge("https://example.com/", "https://example.com/about/", "About us");
    graph.add_edge("https://example.com/about/", "https://example.com/", "Home");
    graph.add_edge("https://example.com/about/", "https://example.com/team/", "Team, \"the\" people");
    let sitemap_urls = vec![
        "https://example.com/about".to_string(),
        "https://example.com/old-offer".to_string(),
    ];
    depth::reconcile_sitemap(&mut graph, &sitemap_urls);
    let depths = depth::resolve(&graph, "https://example.com/");

    CrawlOutcome {
        seed: "https://example.com/".to_string(),
        max_depth: 2,
        graph,
        depths,
        sitemap_urls,
        pages_fetched: 3,
        cancelled: false,
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
    assert!(matches!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv)));
    assert!(matches!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown)));
    assert!(matches!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("html").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Report Data Tests
// ============================================================================

#[test]
fn test_gather_report_data_totals() {
    let data = gather_report_data(&sample_outcome(), None);

    assert_eq!(data.total_nodes, 4);
    assert_eq!(data.total_edges, 3);
    assert_eq!(data.reciprocal_pairs, 1);
    assert_eq!(data.nodes.len(), 4);
    assert_eq!(data.sitemap.total, 2);
    assert_eq!(data.sitemap.orphaned, vec!["https://example.com/old-offer/"]);

    let histogram: Vec<_> = data
        .depth_histogram
        .iter()
        .map(|entry| (entry.depth, entry.pages))
        .collect();
    assert_eq!(histogram, vec![(Some(0), 1), (Some(1), 1), (Some(2), 1), (None, 1)]);
}

#[test]
fn test_gather_report_data_depth_band() {
    let data = gather_report_data(&sample_outcome(), Some((0, 1)));

    assert_eq!(data.total_nodes, 4);
    assert_eq!(data.nodes.len(), 2);
    assert_eq!(data.edges.len(), 2);
    assert!(data.edges.iter().all(|edge| edge.reciprocal));
}

// ============================================================================
// Generator Tests
// ============================================================================

#[test]
fn test_text_report() {
    let report = generate_text_report(&gather_report_data(&sample_outcome(), None));

    assert!(report.contains("Seed:          https://example.com/"));
    assert!(report.contains("Pages found:   4"));
    assert!(report.contains("Reciprocal:    1 pairs"));
    assert!(report.contains("## example.com"));
    assert!(report.contains("[1] /about/  (in 1, out 2) [sitemap]"));
    assert!(report.contains("[unreachable] /old-offer/"));
    assert!(report.contains("orphan  https://example.com/old-offer/"));
    assert!(!report.contains("stopped early"));
}

#[test]
fn test_text_report_without_sitemap() {
    let mut outcome = sample_outcome();
    outcome.sitemap_urls.clear();
    outcome.cancelled = true;
    let report = generate_text_report(&gather_report_data(&outcome, None));

    assert!(report.contains("No sitemap found."));
    assert!(report.contains("stopped early"));
}

#[test]
fn test_json_report() {
    let json = generate_json_report(&gather_report_data(&sample_outcome(), None)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "sitegraph");
    assert_eq!(report["crawl"]["seed"], "https://example.com/");
    assert_eq!(report["summary"]["total_pages"], 4);
    assert_eq!(report["pages"].as_array().unwrap().len(), 4);
    assert_eq!(report["links"].as_array().unwrap().len(), 3);
    assert_eq!(report["sitemap"]["orphaned"][0], "https://example.com/old-offer/");

    let orphan = report["pages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|page| page["url"] == "https://example.com/old-offer/")
        .unwrap();
    assert!(orphan["depth"].is_null());
}

#[test]
fn test_csv_report() {
    let csv = generate_csv_report(&gather_report_data(&sample_outcome(), None)).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "source,target,label,reciprocal,source_depth,target_depth");
    assert_eq!(lines.len(), 1 + 3 + 1);
    assert!(lines.contains(&"https://example.com/,https://example.com/about/,About us,true,0,1"));
    assert!(lines.contains(
        &"https://example.com/about/,https://example.com/team/,\"Team, \"\"the\"\" people\",false,1,2"
    ));
    assert!(lines.contains(&"https://example.com/old-offer/,,,false,unreachable,"));
}

#[test]
fn test_csv_report_quotes_labels_with_commas_and_quotes() {
    let mut outcome = sample_outcome();
    outcome.graph.add_edge(
        "https://example.com/team/",
        "https://example.com/",
        "Back, to \"home\"\nnow",
    );
    let csv = generate_csv_report(&gather_report_data(&outcome, None)).unwrap();

    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
    let row = rows
        .iter()
        .find(|row| &row[0] == "https://example.com/team/")
        .unwrap();
    assert_eq!(&row[1], "https://example.com/");
    assert_eq!(&row[2], "Back, to \"home\"\nnow");
    assert_eq!(row.len(), 6);
    assert!(csv.contains("\"Back, to \"\"home\"\"\nnow\""));
}

#[test]
fn test_generate_report_csv_dispatch() {
    let data = gather_report_data(&sample_outcome(), None);
    let csv = generate_report(&data, ReportFormat::Csv).unwrap();
    assert!(csv.starts_with("source,target,label,reciprocal,source_depth,target_depth"));
}

#[test]
fn test_markdown_report() {
    let md = generate_markdown_report(&gather_report_data(&sample_outcome(), None));

    assert!(md.starts_with("# Internal link report"));
    assert!(md.contains("| unreachable | 1 |"));
    assert!(md.contains("| https://example.com/about/ | 1 | 1 | 2 | yes |"));
    assert!(md.contains("### Orphaned pages"));
    assert!(md.contains("- https://example.com/old-offer/"));
}

#[test]
fn test_generate_report_dispatch() {
    let data = gather_report_data(&sample_outcome(), None);
    let text = generate_report(&data, ReportFormat::Text).unwrap();
    assert!(text.contains("SITEGRAPH INTERNAL LINK REPORT"));
    let json = generate_report(&data, ReportFormat::Json).unwrap();
    assert!(json.trim_start().starts_with('{'));
}

#[test]
fn test_save_report() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("report.md");
    save_report("# hello\n", &path)?;
    assert_eq!(std::fs::read_to_string(&path)?, "# hello\n");
    Ok(())
}
