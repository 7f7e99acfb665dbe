//! API error type and the translation of errors into HTTP responses.
//!
//! Handlers return `Result<_, ApiError>`. The error's response carries a
//! generic plain-text message; the underlying cause travels in the response
//! extensions and is only written into the body by [`attach_error_detail`]
//! when debug mode is on.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::config::AppState;
use crate::db::DbError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} ID must be an integer")]
    BadId(&'static str),

    #[error("missing auth token")]
    Unauthenticated,

    #[error("auth token expired; please log in again")]
    TokenExpired,

    #[error("invalid auth token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("only available in debug mode")]
    DebugOnly,

    #[error("{0}")]
    NotFound(String),

    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            context,
            source: source.into(),
        }
    }

    /// Map a repository error, using `context` as the message for failures
    /// that are not the caller's fault.
    pub fn from_db(context: &'static str, err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => Self::NotFound(err.to_string()),
            DbError::InvalidData(msg) => Self::Validation(msg),
            other => Self::internal(context, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadId(_) | Self::InvalidToken(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials | Self::DebugOnly => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Underlying cause, if any. Only shown to clients in debug mode.
    fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidToken(e) => Some(e.to_string()),
            Self::Internal { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Missing => Self::Unauthenticated,
            AuthError::Expired => Self::TokenExpired,
            AuthError::Invalid(e) => Self::InvalidToken(e),
            AuthError::Signing(_) => Self::internal("could not sign token", err),
            AuthError::Hash(_) => Self::internal("problem checking password", err),
        }
    }
}

/// Attach handler context to repository errors.
pub trait DbResultExt<T> {
    fn or_api(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> DbResultExt<T> for Result<T, DbError> {
    fn or_api(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_db(context, e))
    }
}

/// Message and cause of an error response, kept for [`attach_error_detail`].
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let detail = self.detail();

        if status.is_server_error() {
            error!(%status, error = %message, detail = detail.as_deref().unwrap_or(""), "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }

        let mut response = (status, message.clone()).into_response();
        if let Some(detail) = detail {
            response
                .extensions_mut()
                .insert(ErrorDetail { message, detail });
        }
        response
    }
}

/// Response-translation layer: in debug mode, append the recorded cause of
/// an error to its body.
pub async fn attach_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorDetail { message, detail }) = response.extensions_mut().remove::<ErrorDetail>()
    else {
        return response;
    };

    if state.config.debug {
        (response.status(), format!("{message}: {detail}")).into_response()
    } else {
        response
    }
}
