//! Authentication middleware that checks basic auth credentials and the card owner role.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use tokio::task;

use crate::{AppState, Error, auth::Authenticator};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// Checks usernames and passwords.
    pub authenticator: Arc<dyn Authenticator>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            authenticator: state.authenticator.clone(),
        }
    }
}

/// Middleware function that checks for valid basic auth credentials belonging to a card owner.
///
/// The [Username](crate::Username) is placed into the request and then the request executed
/// normally if the user may access the API. Otherwise responds with:
/// - 401 Unauthorized if the credentials are missing or wrong,
/// - 403 Forbidden if the user does not have the card owner role.
///
/// **Note**: Route handlers can use the function argument `Extension(owner): Extension<Username>`
/// to receive the authenticated user's name.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let Some(credentials) = request.headers().typed_get::<Authorization<Basic>>() else {
        tracing::debug!("Request is missing basic auth credentials.");
        return Error::MissingCredentials.into_response();
    };

    let username = credentials.username().to_owned();
    let password = credentials.password().to_owned();
    let authenticator = state.authenticator.clone();

    // Password hashing is CPU bound, keep it off the async workers.
    let check = task::spawn_blocking(move || authenticator.authenticate(&username, &password));

    let user = match check.await {
        Ok(Ok(user)) => user,
        Ok(Err(Error::InvalidCredentials)) => {
            tracing::info!(
                "Invalid credentials for user \"{}\".",
                credentials.username()
            );
            return Error::InvalidCredentials.into_response();
        }
        Ok(Err(error)) => return error.into_response(),
        Err(error) => {
            tracing::error!("Authentication task failed: {error}");
            return Error::AuthTaskFailed(error.to_string()).into_response();
        }
    };

    if !user.role.is_card_owner() {
        return Error::Forbidden(user.username.to_string()).into_response();
    }

    let (mut parts, body) = request.into_parts();
    parts.extensions.insert(user.username);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
