use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

/// Error kinds surfaced to the CLI layer. Each kind maps to one of the
/// error categories in the design notes: user input, precondition
/// failure, transient I/O, corruption, or an unsupported-feature gap
/// between storage backends.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("{message}")]
    Precondition { message: String },

    #[error("record not found")]
    NotFound,

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("database is busy")]
    Busy,

    #[error("data corruption detected: {message}")]
    Corruption { message: String },

    #[error("{feature} is not supported by this storage backend")]
    Unsupported { feature: String },

    #[error("database error: {message}")]
    Database { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "daylit::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "daylit::validation", %message, %details, "validation error with details");
        AppError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "daylit::precondition", %message, "precondition failure");
        AppError::Precondition { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "daylit::store", "record not found");
        AppError::NotFound
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "daylit::store", %message, "conflict");
        AppError::Conflict { message }
    }

    pub fn corruption(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "daylit::doctor", %message, "corruption detected");
        AppError::Corruption { message }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        AppError::Unsupported {
            feature: feature.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "daylit::store", %message, "database error");
        AppError::Database { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "daylit::other", %message, "error");
        AppError::Other(message)
    }

    /// True for errors that the notifier's retry loop should retry
    /// ("database busy / database is locked").
    pub fn is_busy(&self) -> bool {
        matches!(self, AppError::Busy)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::Error::{QueryReturnedNoRows, SqliteFailure};
        use rusqlite::ErrorCode;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
                AppError::conflict("unique or foreign-key constraint violated")
            }
            SqliteFailure(err, _)
                if err.code == ErrorCode::DatabaseBusy || err.code == ErrorCode::DatabaseLocked =>
            {
                AppError::Busy
            }
            _ => {
                error!(target: "daylit::store", error = ?error, "sqlite error");
                AppError::database(error.to_string())
            }
        }
    }
}

impl From<postgres::Error> for AppError {
    fn from(error: postgres::Error) -> Self {
        if let Some(db_error) = error.as_db_error() {
            match db_error.code() {
                code if *code == postgres::error::SqlState::UNIQUE_VIOLATION
                    || *code == postgres::error::SqlState::FOREIGN_KEY_VIOLATION =>
                {
                    return AppError::conflict(db_error.message().to_string());
                }
                code if *code == postgres::error::SqlState::T_R_SERIALIZATION_FAILURE
                    || *code == postgres::error::SqlState::LOCK_NOT_AVAILABLE =>
                {
                    return AppError::Busy;
                }
                _ => {}
            }
        }
        error!(target: "daylit::store", error = %error, "postgres error");
        AppError::database(error.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(error: r2d2::Error) -> Self {
        AppError::database(format!("connection pool error: {error}"))
    }
}
