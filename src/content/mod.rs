pub mod summary;

pub use summary::{truncate_chars, SummaryCleaner, DEFAULT_SUMMARY_LENGTH, TRUNCATION_MARKER};
