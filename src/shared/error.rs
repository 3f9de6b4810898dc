use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported load item: {0}")]
    UnsupportedItem(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_yaml::Error> for CollectionError {
    fn from(e: serde_yaml::Error) -> Self {
        CollectionError::Config(e.to_string())
    }
}
