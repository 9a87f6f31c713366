//! pysummary CLI entry point.

use clap::Parser;
use pysummary::cli::{self, Cli, ColorMode, Commands, EXIT_ERROR};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();

    cli::init_color(cli.color);

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(!matches!(cli.color, ColorMode::Never))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(EXIT_ERROR);
    }

    let outcome = match &cli.command {
        Commands::Summarize(args) => cli::run_summarize(args),
        Commands::Search(args) => cli::run_search(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
