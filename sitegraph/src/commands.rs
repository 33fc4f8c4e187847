use clap::{arg, command};
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn config_arg() -> clap::Arg {
    arg!(-c --"config" <PATH>)
        .required(false)
        .help("Path to a JSON config file (default: ~/.config/sitegraph/config.json)")
        .value_parser(clap::value_parser!(PathBuf))
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegraph")
        .about("Maps a website's internal links and finds orphaned sitemap pages")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(arg!(-v --"verbose" "Log crawl decisions to stderr").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site breadth-first from a seed URL, build its internal link \
                graph and compare it with the sitemap.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to start crawling from"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth to fetch (default: 3)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async workers fetching pages concurrently (default: 10)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds (default: 8)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"deadline" <SECONDS>)
                        .required(false)
                        .help("Stop the crawl after this many seconds and report what was found")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"min-depth" <DEPTH>)
                        .required(false)
                        .help("Only list pages whose depth is >= DEPTH in the report")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"view-max-depth" <DEPTH>)
                        .required(false)
                        .help("Only list pages whose depth is <= DEPTH in the report")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: print to stdout)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(config_arg()),
        )
        .subcommand(
            command!("config")
                .about("Print the effective crawler configuration as JSON")
                .arg(config_arg()),
        )
}
