use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use inventory_sync::cli::{sweep, sync, transform};
use inventory_sync::logging;
use inventory_sync::util::env as env_util;

#[derive(Parser, Debug)]
#[command(
    name = "inventory_sync",
    version,
    about = "Fetch the vendor inventory feed when it changes and build the SellerActive catalog"
)]
struct Cli {
    /// Print the outcome as JSON instead of a single line
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Download the remote file if it is newer than the cache, then transform it (default)
    Sync {
        /// Override SYNC_LOCAL_DIR
        #[arg(long)]
        local_dir: Option<PathBuf>,
        /// Override SYNC_RETENTION_HOURS
        #[arg(long)]
        retention_hours: Option<u64>,
        /// Override SYNC_TIME_FORMAT (strftime or PHP date style)
        #[arg(long)]
        time_format: Option<String>,
    },
    /// Show whether the next sync would download, without changing anything
    Status {
        /// Override SYNC_LOCAL_DIR
        #[arg(long)]
        local_dir: Option<PathBuf>,
        /// Override SYNC_TIME_FORMAT (strftime or PHP date style)
        #[arg(long)]
        time_format: Option<String>,
    },
    /// Price a local inventory CSV
    Transform {
        /// Inventory CSV to read
        input: PathBuf,
        /// Output path (default: <SYNC_LOCAL_DIR>/<SYNC_OUTPUT_FILE>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete cached files older than the retention age
    Sweep {
        /// Directory to sweep (default: SYNC_LOCAL_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Override SYNC_RETENTION_HOURS
        #[arg(long)]
        retention_hours: Option<u64>,
    },
}

fn main() -> ExitCode {
    env_util::init_env();
    if let Err(e) = logging::init_tracing(logging::DEFAULT_FILTER) {
        eprintln!("{e}");
    }

    let cli = Cli::parse();
    let json = cli.json;
    let result = match cli.command.unwrap_or(Commands::Sync {
        local_dir: None,
        retention_hours: None,
        time_format: None,
    }) {
        Commands::Sync {
            local_dir,
            retention_hours,
            time_format,
        } => sync::run(sync::SyncCommandConfig {
            local_dir,
            retention_hours,
            time_format,
            json,
        }),
        Commands::Status {
            local_dir,
            time_format,
        } => sync::status(sync::SyncCommandConfig {
            local_dir,
            time_format,
            json,
            ..Default::default()
        }),
        Commands::Transform { input, output } => {
            transform::run(transform::TransformConfig {
                input,
                output,
                json,
            })
        }
        Commands::Sweep {
            dir,
            retention_hours,
        } => sweep::run(sweep::SweepConfig {
            dir,
            retention_hours,
            json,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "outcome": "failed", "error": e.to_string() })
                );
            } else {
                println!("failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
