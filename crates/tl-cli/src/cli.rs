use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tl_ledger::HashAlgorithm;

#[derive(Parser)]
#[command(
    name = "trackline",
    about = "Trackline: tamper-evident package tracking ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML server configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Record tracking events interactively from stdin
    Track(TrackArgs),
    /// Walk through append, linkage and tamper detection
    Demo(DemoArgs),
    /// Validate an exported chain
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub max_sessions: Option<usize>,
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
}

#[derive(Args)]
pub struct TrackArgs {
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(long, default_value = "PKG1")]
    pub package_id: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// JSON file: an array of records, or a rendered chain with a `records` field
    pub path: PathBuf,
    #[arg(long, default_value = "sha256")]
    pub algorithm: HashAlgorithm,
}
