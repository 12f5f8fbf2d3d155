use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "trybe-images",
    version,
    about = "Resolve and inspect cached event and profile image URLs",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Storage bucket.
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Storage lookup timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Directory of the persisted URL cache.
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Keep the URL cache in memory only.
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Report fallbacks of images from sample hosts.
    #[arg(long, global = true)]
    pub trace_fallbacks: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Operator commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve an ordered candidate list.
    Resolve {
        /// Image references, most preferred first.
        #[arg(required = true)]
        references: Vec<String>,
    },
    /// Resolve the image of entities read from a JSON file (object or array).
    Entity {
        /// JSON file with one entity or a list of entities.
        path: PathBuf,
        /// Per-entity override, as `id=url`.
        #[arg(long = "override", value_name = "ID=URL", value_parser = parse_override)]
        overrides: Vec<(String, String)>,
    },
    /// Print cache statistics.
    Stats,
    /// List cached entries, oldest first.
    List,
    /// Remove exact cache keys.
    Invalidate {
        /// Keys to remove.
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Remove every cache key containing a substring.
    InvalidatePrefix {
        /// Substring to match.
        needle: String,
    },
    /// Drop expired entries.
    Sweep,
    /// Empty the cache.
    Clear,
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, url)) if !id.is_empty() && !url.is_empty() => {
            Ok((id.to_string(), url.to_string()))
        }
        _ => Err(format!("expected ID=URL, got `{s}`")),
    }
}
