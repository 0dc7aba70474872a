use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read case feed: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("case feed has no `{0}` column")]
    MissingColumn(&'static str),

    #[error("case feed has no parseable date columns")]
    NoDateColumns,

    #[error("date `{0}` is not a column of the case feed")]
    UnknownDate(String),

    #[error("cannot locate a sample in an empty series")]
    EmptySeries,
}
