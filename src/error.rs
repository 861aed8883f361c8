use thiserror::Error;

/// Failures of a record source. Data-shape problems never surface here.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read records: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
