use clap::Parser;
use tracing_subscriber::EnvFilter;

use phishguard::cli::{self, Cli, Commands};
use phishguard::errors::PhishGuardError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        Commands::Check(args) => cli::check::handle_check(args).await,
        Commands::Text(args) => cli::check::handle_text(args).await,
        Commands::Watch(args) => cli::watch::handle_watch(args).await,
        Commands::Stats(args) => cli::stats::handle_stats(args).await,
        Commands::Validate(args) => cli::check::handle_validate(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                PhishGuardError::Config(_) => 2,
                PhishGuardError::Database(_) => 3,
                PhishGuardError::Credential(_) => 4,
                PhishGuardError::InvalidSubject(_) => 5,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
