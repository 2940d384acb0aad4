use crate::domain::error::DomainError;
use async_graphql::ErrorExtensions;
use thiserror::Error;
use tracing::{error, warn};

/// Error surfaced to GraphQL clients. The message is sent verbatim and the
/// kind is exposed as `extensions.code`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "UNAUTHENTICATED",
            ApiError::Validation(_) => "BAD_USER_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        let code = self.code();
        match self {
            ApiError::Authentication(_) => warn!(error = %self, code, "Authentication error"),
            ApiError::Validation(_) => warn!(error = %self, code, "Validation error"),
            ApiError::NotFound(_) => warn!(error = %self, code, "Resource not found"),
            ApiError::Internal(_) => error!(error = %self, code, "Internal error"),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Authentication(msg)) => ApiError::Authentication(msg.clone()),
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            // Anything else came out of the store itself.
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        self.log();
        async_graphql::Error::new(self.to_string())
            .extend_with(|_, e| e.set("code", self.code().to_string()))
    }
}

/// Resolver-side conversion of service failures.
pub fn to_graphql_error(err: anyhow::Error) -> async_graphql::Error {
    ApiError::from(err).extend()
}
