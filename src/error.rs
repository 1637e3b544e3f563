use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wikimedia API error: {0}")]
    Upstream(#[from] wikimedia_client::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid manifest URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
