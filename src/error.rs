use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("{0}")]
    AttemptClosed(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upload(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::AttemptClosed(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the person who sent the request.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Upload(_)
            | AppError::AttemptClosed(_) => self.to_string(),
            AppError::Http(e) => format!("Upload failed: {e}"),
            _ => "Something went wrong, please try again.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Upload(_) | AppError::Http(_) => tracing::warn!("{}", self),
            _ if status.is_server_error() => tracing::error!("{}", self),
            _ => tracing::debug!("{}", self),
        }

        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
