use std::path::PathBuf;

use hybridfs_contents::Error as ContentsError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Contents(#[from] ContentsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
