//! Main entry point for shpdiff CLI

use clap::Parser;
use shpdiff::cli::Cli;
use shpdiff::commands::execute_command;
use shpdiff::config::ShpdiffConfig;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; --verbose raises the default level
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = match ShpdiffConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Execute the command
    if let Err(e) = execute_command(cli.command, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
