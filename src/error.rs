use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure while reading the employee CSV. No partial dataset is
/// ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required columns: {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

/// A `--select` value that is not a usable `FIELD=VALUE` pair.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("expected FIELD=VALUE, got {0:?}")]
    MalformedSelection(String),

    #[error("unknown filter field {0:?} (expected department, position, manager, region or state)")]
    UnknownField(String),
}
