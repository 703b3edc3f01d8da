use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort loading a store. No partial corpus survives one.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open subtitle store {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("subtitle store {0} contains no tables")]
    NoTables(PathBuf),
    #[error("query against table '{table}' failed: {source}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}
