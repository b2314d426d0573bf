use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Region directory error: {0}")]
    RegionDirectory(String),

    #[error("Invalid region code: {0}")]
    InvalidRegionCode(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Timed out after {0} ms: {1}")]
    Timeout(u64, String),

    #[error("Narration error: {0}")]
    Narration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<polars::error::PolarsError> for AnalyticsError {
    fn from(err: polars::error::PolarsError) -> Self {
        AnalyticsError::Polars(err.to_string())
    }
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(err: sqlx::Error) -> Self {
        AnalyticsError::Database(err.to_string())
    }
}

impl AnalyticsError {
    /// Whether this error came from the data engine (fatal to the request).
    pub fn is_data_engine_failure(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Execution(_)
                | AnalyticsError::Timeout(..)
                | AnalyticsError::Polars(_)
                | AnalyticsError::Database(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
