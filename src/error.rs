use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Directory can't be empty")]
    EmptyDirectory,

    #[error("Days to delete can't be smaller than 1 (got {0})")]
    Threshold(i64),

    #[error("Days to delete can't be more than {max} (got {0})", max = u32::MAX)]
    ThresholdTooLarge(i64),
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot read directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
