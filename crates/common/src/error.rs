//! Error types for roompoll.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Every failure is reported to the caller as a value; none of these are
/// retried by the service layer.
#[derive(Debug, Error)]
pub enum AppError {
    // === Authorization ===
    #[error("Invalid admin code")]
    InvalidAdminCode,

    #[error("Invalid code")]
    InvalidCode,

    // === Lookups ===
    #[error("Room not found")]
    RoomNotFound,

    #[error("Poll not found")]
    PollNotFound,

    #[error("Vote not found")]
    VoteNotFound,

    // === Gated reads and writes ===
    #[error("Results are not visible for this poll")]
    ResultsNotVisible,

    #[error("Poll is not accepting votes")]
    PollNotActive,

    // === Structural edits ===
    #[error("Question \"{0}\" has votes and cannot be removed")]
    QuestionHasVotes(String),

    #[error("Choice \"{0}\" has votes and cannot be removed")]
    ChoiceHasVotes(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAdminCode | Self::InvalidCode => StatusCode::UNAUTHORIZED,
            Self::RoomNotFound | Self::PollNotFound | Self::VoteNotFound => StatusCode::NOT_FOUND,
            Self::ResultsNotVisible | Self::PollNotActive => StatusCode::FORBIDDEN,
            Self::QuestionHasVotes(_) | Self::ChoiceHasVotes(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAdminCode => "INVALID_ADMIN_CODE",
            Self::InvalidCode => "INVALID_CODE",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::PollNotFound => "POLL_NOT_FOUND",
            Self::VoteNotFound => "VOTE_NOT_FOUND",
            Self::ResultsNotVisible => "RESULTS_NOT_VISIBLE",
            Self::PollNotActive => "POLL_NOT_ACTIVE",
            Self::QuestionHasVotes(_) => "QUESTION_HAS_VOTES",
            Self::ChoiceHasVotes(_) => "CHOICE_HAS_VOTES",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
