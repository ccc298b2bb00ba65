use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use axum_extra::headers::{Authorization, HeaderMapExt};
use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, InMemoryUsers, PaginationConfig, build_router, initialize_db, seed_demo_data,
};

/// Encode `username` and `password` as the value of a basic auth `Authorization` header.
#[track_caller]
pub(crate) fn basic_auth(username: &str, password: &str) -> HeaderValue {
    let mut headers = HeaderMap::new();
    headers.typed_insert(Authorization::basic(username, password));

    headers
        .remove(AUTHORIZATION)
        .expect("Authorization header missing")
}

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize_db(&connection).expect("could not initialize test DB");

    connection
}

/// A server for the full app with the demo users and demo cash cards.
#[track_caller]
pub(crate) fn get_test_server() -> TestServer {
    let connection = must_create_test_connection();
    seed_demo_data(&connection).expect("could not seed test DB");

    let state = AppState::new(
        Arc::new(Mutex::new(connection)),
        Arc::new(InMemoryUsers::demo(4).expect("could not hash demo passwords")),
        PaginationConfig::default(),
    )
    .expect("could not create app state");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}
