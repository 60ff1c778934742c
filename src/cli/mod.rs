pub mod commands;

use clap::{Parser, Subcommand};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feed-digest")]
#[command(about = "Aggregate RSS/Atom feeds into a categorized JSON snapshot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.json", env = "FEED_DIGEST_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all configured feeds and write the snapshot
    Fetch {
        /// Override the snapshot output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the per-category article cap
        #[arg(short, long)]
        max_items: Option<usize>,

        /// Number of feeds fetched at the same time
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Rewrite the report arrays of a static index page
    UpdateIndex {
        /// Directory holding the reports and the index page
        dir: PathBuf,

        /// Index page file name inside the directory
        #[arg(long, default_value = crate::index::DEFAULT_INDEX_FILE)]
        index_file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        commands::init_logging(self.debug, self.verbose, self.json_logs)?;

        match self.command {
            Commands::Fetch { output, max_items, concurrency } => {
                commands::fetch(&self.config, output, max_items, concurrency).await
            }
            Commands::UpdateIndex { dir, index_file } => {
                commands::update_index(dir, index_file)
            }
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}
