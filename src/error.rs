use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetChatError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Text generation service is not configured")]
    ServiceNotConfigured,

    #[error("Text generation service error: {0}")]
    ServiceError(String),

    #[error("Text generation service returned an empty answer")]
    EmptyResponse,

    #[cfg(feature = "groq")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BudgetChatError>;
