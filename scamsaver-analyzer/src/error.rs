use thiserror::Error;

/// Message shown to users for every failed analysis, whatever the cause.
pub const USER_FACING_FAILURE: &str = "Analysis failed. Please try a different URL.";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No URL was provided")]
    EmptyInput,

    #[error("Request to analysis provider failed: {0}")]
    RequestFailure(String),

    #[error("Provider response violated the analysis schema: {0}")]
    SchemaViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AnalysisError {
    /// The single generic message surfaced at the UI boundary.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_FAILURE
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::RequestFailure(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::SchemaViolation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
