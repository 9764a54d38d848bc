use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the file and configuration plumbing around the engine.
///
/// The engine itself never fails on malformed CSS; these only come from
/// reading inputs, writing outputs or loading configuration.
#[derive(Debug, Error)]
pub enum PruneError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("no stylesheets to process")]
    NoStylesheets,
}
