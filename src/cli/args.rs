use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fanout")]
#[command(about = "Run tasks with a bounded number of concurrent workers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run simulated tasks that sleep for the given durations
    Simulate {
        /// Task durations in milliseconds; append '!' to make a task fail (e.g. 30!)
        #[arg(required = true, num_args = 1..)]
        durations: Vec<String>,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },

    /// Fetch URLs concurrently and print each HTTP status line
    Fetch {
        /// URLs to request with GET
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Per-request timeout in milliseconds (0 = no per-request timeout)
        #[arg(long, default_value = "10000")]
        request_timeout_ms: u64,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },

    /// Probe file metadata under a directory
    Scan {
        /// Target directory to scan
        target_directory: PathBuf,

        /// Only include files with these extensions (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        extensions: Vec<String>,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },
}

/// ディスパッチ設定に関する共通オプション
#[derive(Args, Debug, Clone)]
pub struct DispatchArgs {
    /// Maximum number of concurrently running tasks (defaults to CPU count x2)
    #[arg(short = 'k', long)]
    pub limit: Option<usize>,

    /// Stop waiting for results after this many milliseconds (0 = wait for all)
    #[arg(short, long, default_value = "0")]
    pub timeout_ms: u64,

    /// Result buffer size (defaults to the concurrency limit)
    #[arg(short, long)]
    pub capacity: Option<usize>,

    /// Print each result as a JSON line
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}
