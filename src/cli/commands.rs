use clap::{Args, Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "phishguard",
    version,
    long_version = LONG_VERSION,
    about = "Phishing detection engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a single URL
    Check(CheckArgs),
    /// Analyze page text from a file (or '-' for stdin)
    Text(TextArgs),
    /// Scan URLs from stdin through the background queue
    Watch(WatchArgs),
    /// Show detection statistics
    Stats(StatsArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct CheckArgs {
    /// URL to classify
    pub url: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone)]
pub struct TextArgs {
    /// Path to a text file, or '-' to read stdin
    pub file: String,

    /// URL of the page the text came from
    #[arg(long)]
    pub source_url: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone)]
pub struct StatsArgs {
    /// Database path
    #[arg(long, default_value = "./phishguard.db")]
    pub db: String,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// YAML configuration file
    pub config: String,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Detection level override: low, medium, high
    #[arg(long)]
    pub level: Option<String>,

    /// Database path for stats persistence (omit to keep stats in memory)
    #[arg(long)]
    pub db: Option<String>,
}
