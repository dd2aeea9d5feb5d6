use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty response from AI service")]
    EmptyUpstreamResponse,

    #[error("Schema validation failed: {0}")]
    SchemaViolation(String),

    #[error("Upstream service failure: {0}")]
    UpstreamTransport(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProjectionError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so the API key query parameter never reaches logs.
        Self::UpstreamTransport(err.without_url().to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
