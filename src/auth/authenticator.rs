//! Checking a username and password against a set of known users.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{
        PasswordHash,
        user::{Role, User, Username, get_user_by_username},
    },
};

/// Looks up users and verifies their passwords.
pub trait Authenticator: Send + Sync {
    /// Return the user named `username` if `password` matches their password.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::InvalidCredentials] if the user does not exist or the password is wrong,
    /// - [Error::HashingError] if the stored hash could not be checked,
    /// - or another error if the user store could not be read.
    fn authenticate(&self, username: &str, password: &str) -> Result<User, Error>;
}

fn verify_password(user: User, password: &str) -> Result<User, Error> {
    match user.password_hash.verify(password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => {
            tracing::error!("Error verifying password for {}: {error}", user.username);
            Err(Error::HashingError(error.to_string()))
        }
    }
}

/// A fixed set of users held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsers {
    users: HashMap<Username, User>,
}

impl InMemoryUsers {
    /// Create a user store from `users`.
    ///
    /// If two users share a username, the later one wins.
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }

    /// The demonstration accounts, with passwords hashed at `cost`.
    ///
    /// | username | password | role |
    /// |---|---|---|
    /// | sarah1 | abc123 | CARD-OWNER |
    /// | kumar2 | xyz789 | CARD-OWNER |
    /// | hank-owns-no-cards | qrs456 | NON-OWNER |
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if a password could not be hashed.
    pub fn demo(cost: u32) -> Result<Self, Error> {
        let users = demo_users(cost)?;

        Ok(Self::new(users))
    }
}

/// The demonstration accounts as [User]s, see [InMemoryUsers::demo].
///
/// # Errors
///
/// Returns an [Error::HashingError] if a password could not be hashed.
pub fn demo_users(cost: u32) -> Result<Vec<User>, Error> {
    [
        ("sarah1", "abc123", Role::CardOwner),
        ("hank-owns-no-cards", "qrs456", Role::Other("NON-OWNER".to_owned())),
        ("kumar2", "xyz789", Role::CardOwner),
    ]
    .into_iter()
    .map(|(username, password, role)| -> Result<User, Error> {
        let password_hash = PasswordHash::from_raw_password(password, cost)?;
        Ok(User::new(Username::new(username), password_hash, role))
    })
    .collect()
}

impl Authenticator for InMemoryUsers {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, Error> {
        let user = self
            .users
            .get(&Username::new(username))
            .cloned()
            .ok_or(Error::InvalidCredentials)?;

        verify_password(user, password)
    }
}

/// Users stored in the `user` table of a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUsers {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUsers {
    /// Create a new user store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl Authenticator for SQLiteUsers {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, Error> {
        let user = {
            let connection = self.connection.lock().map_err(|error| {
                tracing::error!("could not acquire database lock: {error}");
                Error::DatabaseLockError
            })?;

            match get_user_by_username(username, &connection) {
                Ok(user) => user,
                Err(Error::NotFound) => return Err(Error::InvalidCredentials),
                Err(error) => return Err(error),
            }
        };

        verify_password(user, password)
    }
}
