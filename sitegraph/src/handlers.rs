use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use sitegraph_core::config::{load_config, to_json, validate};
use sitegraph_core::report::{ReportFormat, gather_report_data, generate_report, save_report};
use sitegraph_scanner::CrawlerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

// Re-export crawl types and functions from sitegraph-core
pub use sitegraph_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path};

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.has_host()
    {
        return Some(with_scheme);
    }

    None
}

/// Effective configuration: the config file (or defaults) overridden by any
/// flags present in `args`.
pub fn build_config(args: &ArgMatches) -> Result<CrawlerConfig> {
    let config_path = args.get_one::<PathBuf>("config");
    let mut config = load_config(config_path.map(PathBuf::as_path))?;

    if let Ok(Some(depth)) = args.try_get_one::<usize>("depth") {
        config.max_depth = *depth;
    }
    if let Ok(Some(workers)) = args.try_get_one::<usize>("threads") {
        config.workers = *workers;
    }
    if let Ok(Some(timeout)) = args.try_get_one::<u64>("timeout") {
        config.timeout_secs = *timeout;
    }
    if let Ok(Some(deadline)) = args.try_get_one::<u64>("deadline") {
        config.deadline_secs = Some(*deadline);
    }

    validate(&config)?;
    Ok(config)
}

/// Depth band for the report listing. `None` when neither bound was given.
pub fn depth_band(args: &ArgMatches) -> Result<Option<(usize, usize)>> {
    let min = args.get_one::<usize>("min-depth").copied();
    let max = args.get_one::<usize>("view-max-depth").copied();

    match (min, max) {
        (None, None) => Ok(None),
        (min, max) => {
            let min = min.unwrap_or(0);
            let max = max.unwrap_or(usize::MAX);
            if min > max {
                return Err(anyhow!(
                    "--min-depth ({}) is greater than --view-max-depth ({})",
                    min,
                    max
                ));
            }
            Ok(Some((min, max)))
        }
    }
}

pub fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let raw_url = args
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("--url is required"))?;
    let url = parse_url_line(raw_url).ok_or_else(|| anyhow!("Invalid URL '{}'", raw_url))?;

    let config = build_config(args)?;
    let band = depth_band(args)?;
    let format = report_format(args);
    let output = args.get_one::<PathBuf>("output");
    let show_progress = !quiet && !args.get_flag("no-progress");

    debug!(?config, "Effective crawl configuration");

    if !quiet {
        eprintln!("{} Seed: {}", "→".blue(), url.bright_white());
        eprintln!(
            "{} Depth: {}, workers: {}, timeout: {}s",
            "→".blue(),
            config.max_depth.to_string().bright_white(),
            config.workers.to_string().bright_white(),
            config.timeout_secs.to_string().bright_white()
        );
        if let Some(deadline) = config.deadline_secs {
            eprintln!(
                "{} Deadline: {}s",
                "→".blue(),
                deadline.to_string().bright_white()
            );
        }
        eprintln!();
    }

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with the pages found so far");
            ctrl_c_token.cancel();
        }
    });

    let mut options = CrawlOptions::new(url, config);
    options.show_progress_bars = show_progress;
    options.cancel = cancel;

    let progress: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            eprintln!("{} {}", "✓".green().bold(), msg);
        }))
    };

    let outcome = execute_crawl(options, progress).await;
    ctrl_c.abort();
    let outcome = outcome?;

    if outcome.cancelled && !quiet {
        eprintln!(
            "{} Crawl stopped early, the report covers a partial graph",
            "⚠".yellow().bold()
        );
    }

    let data = gather_report_data(&outcome, band);
    let report = generate_report(&data, format)?;

    match output {
        Some(path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => println!("{}", report),
    }

    Ok(())
}

pub fn handle_config(args: &ArgMatches) -> Result<()> {
    let config = build_config(args)?;
    println!("{}", to_json(&config)?);
    Ok(())
}
