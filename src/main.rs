use std::process;

use clap::Parser;

use freight::cli::{self, Cli};
use freight::config::Config;
use freight::logging;

fn main() {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    logging::init(config.log_filter.as_deref(), cli.verbose);

    if let Err(e) = cli::run(cli, &config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
