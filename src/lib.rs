pub mod cli;
pub mod config;
pub mod content;
pub mod digest;
pub mod error;
pub mod feed;
pub mod index;
pub mod pipeline;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunSummary};
