use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage i/o at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage file {0} must hold a json object of strings")]
    Corrupt(PathBuf),
}

pub type StoreResult<T> = Result<T, StoreError>;
