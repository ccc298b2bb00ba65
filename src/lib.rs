//! Cash Cards is a small REST API for keeping track of personal monetary records.
//!
//! Users authenticate with HTTP Basic auth and may only ever see, change or delete
//! the cash cards they created themselves.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod cash_card;
mod db;
mod endpoints;
mod error;
mod logging;
mod pagination;
mod routing;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Authenticator, InMemoryUsers, PasswordHash, Role, SQLiteUsers, User, Username, create_user,
    demo_users,
};
pub use cash_card::{CashCard, CashCardId};
pub use db::{initialize as initialize_db, seed_demo_data};
pub use error::Error;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("could not listen for the ctrl+c signal: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
