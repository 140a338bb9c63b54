//! Unified error types for the token service.
//! Used by: config, token, auth, handlers.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Reasons a presented bearer token is refused. Callers only ever see a
/// generic 401; the variant is kept for logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("bad signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("audience mismatch")]
    AudienceMismatch,
}

impl TokenError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::AudienceMismatch => "audience_mismatch",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BearerRequired(String),

    #[error("invalid token")]
    Token(#[from] TokenError),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Unauthorized(_) | Error::BearerRequired(_) | Error::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::Config(_) | Error::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let challenge = matches!(self, Error::BearerRequired(_) | Error::Token(_));

        let mut response = (status, Json(ErrorBody { message: self.to_string() })).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, Error>;
