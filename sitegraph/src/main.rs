use colored::Colorize;
use sitegraph::commands::command_argument_builder;
use sitegraph::handlers::{handle_config, handle_crawl, init_tracing};
use sitegraph_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_tracing(verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("config", primary_command)) => handle_config(primary_command),
        // No subcommand provided, just show the banner
        _ => return,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
