// src/error.rs

use std::path::PathBuf;

/// Everything that can go wrong while fetching and persisting one source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GET {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not find the '{marker}' table in the HTML (upstream page changed?)")]
    TableNotFound { marker: String },

    #[error("malformed tabular body: {0}")]
    Parse(String),

    #[error("malformed CSV body: {0}")]
    Csv(#[from] csv::Error),

    #[error("writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
