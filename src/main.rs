use std::process;
use clap::Parser;

use feed_digest::cli::Cli;

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
