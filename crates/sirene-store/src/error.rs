use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported format: {format:?} (must be \"json\" or \"csv\")")]
    UnsupportedFormat { format: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}
