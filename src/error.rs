//! Defines the app level error type and its conversion to HTTP responses.

use axum::{
    Json,
    http::{StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The realm sent to clients in the `WWW-Authenticate` challenge.
pub const AUTH_REALM: &str = "cashcards";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not include a usable `Authorization` header.
    #[error("missing or malformed basic auth credentials")]
    MissingCredentials,

    /// The username does not exist or the password does not match.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The user authenticated successfully but does not have the role needed
    /// to access the resource.
    #[error("user \"{0}\" does not have the role needed to access this resource")]
    Forbidden(String),

    /// The requested resource was not found.
    ///
    /// Cash cards owned by another user are reported as not found so that
    /// clients cannot probe for the existence of other users' records.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The list endpoint was asked to sort by a field that cash cards do not have.
    #[error("cannot sort by \"{0}\", expected one of: id, amount, owner")]
    InvalidSortField(String),

    /// The list endpoint was given a sort direction other than asc or desc.
    #[error("invalid sort direction \"{0}\", expected asc or desc")]
    InvalidSortDirection(String),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" already exists in the database")]
    DuplicateUsername(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The background task that checks a password panicked or was cancelled.
    #[error("the authentication task failed: {0}")]
    AuthTaskFailed(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::MissingCredentials | Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, format!("Basic realm=\"{AUTH_REALM}\""))],
            )
                .into_response(),
            Error::Forbidden(username) => {
                tracing::info!("rejected user \"{username}\" without the card owner role");
                StatusCode::FORBIDDEN.into_response()
            }
            Error::NotFound => StatusCode::NOT_FOUND.into_response(),
            error @ (Error::InvalidSortField(_) | Error::InvalidSortDirection(_)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            error @ Error::DuplicateUsername(_) => (
                StatusCode::CONFLICT,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
