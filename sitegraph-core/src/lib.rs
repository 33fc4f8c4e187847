pub mod config;
pub mod crawl;
pub mod report;
pub mod view;

use colored::Colorize;

const BANNER: &str = r#"
     _ _                              _
 ___(_) |_ ___  __ _ _ __ __ _ _ __ | |__
/ __| | __/ _ \/ _` | '__/ _` | '_ \| '_ \
\__ \ | ||  __/ (_| | | | (_| | |_) | | | |
|___/_|\__\___|\__, |_|  \__,_| .__/|_| |_|
               |___/          |_|
"#;

pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "internal link graph & orphan page finder".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
