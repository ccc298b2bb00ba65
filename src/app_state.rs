//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, auth::Authenticator, db::initialize, pagination::PaginationConfig};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Checks the credentials sent with each request.
    pub authenticator: Arc<dyn Authenticator>,

    /// The config that controls how to page through lists of cash cards.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// The connection is shared so that a [SQLiteUsers](crate::SQLiteUsers) authenticator can use
    /// the same database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Arc<Mutex<Connection>>,
        authenticator: Arc<dyn Authenticator>,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        {
            let connection = db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;
            initialize(&connection)?;
        }

        Ok(Self {
            db_connection,
            authenticator,
            pagination_config,
        })
    }
}
