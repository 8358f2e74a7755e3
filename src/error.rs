use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShotDataError>;

#[derive(Error, Debug)]
pub enum ShotDataError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid match record #{index} in {}: {reason}", path.display())]
    InvalidMatch {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ShotDataError {
    /// Parse-kind failures: the file exists but its contents are unusable.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            ShotDataError::Parse { .. } | ShotDataError::InvalidMatch { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ShotDataError::FileNotFound { .. })
    }
}

/// Reads and parses a JSON document, mapping a missing file to `FileNotFound`.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ShotDataError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => {
            return Err(ShotDataError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    serde_json::from_str(&contents).map_err(|source| ShotDataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
