use std::io;
use std::path::{Path, PathBuf};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::feed::fetcher::FeedFetcher;
use crate::index::IndexUpdater;
use crate::pipeline::Pipeline;

/// Fetch every configured feed and write the snapshot
pub async fn fetch(
    config_path: &Path,
    output: Option<PathBuf>,
    max_items: Option<usize>,
    concurrency: Option<usize>,
) -> Result<()> {
    let mut config = Config::load_with_env(config_path)?;

    if let Some(output) = output {
        config.output_path = output;
    }
    if let Some(max_items) = max_items {
        config.max_items_per_category = max_items;
    }
    if let Some(concurrency) = concurrency {
        config.concurrent_fetches = concurrency;
    }
    config.validate()?;

    info!(
        "Loaded {} categories from {}",
        config.categories.len(),
        config_path.display()
    );

    let fetcher = FeedFetcher::from_config(&config)?;
    let summary = Pipeline::new(fetcher, config).run().await?;

    debug!(stats = ?summary.stats, "Run finished");
    println!("{}", summary);

    Ok(())
}

/// Regenerate the report arrays of the index page in `dir`
pub fn update_index(dir: PathBuf, index_file: PathBuf) -> Result<()> {
    let summary = IndexUpdater::new(dir)
        .with_index_file(index_file)
        .update()?;

    println!(
        "Index updated: {} tech, {} music reports",
        summary.count("tech"),
        summary.count("music")
    );

    Ok(())
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Initialize logging to stderr
pub fn init_logging(debug: bool, verbose: bool, json: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        std::env::var("FEED_DIGEST_LOG_LEVEL")
            .ok()
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"))
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    debug!("Logging initialized");
    Ok(())
}
