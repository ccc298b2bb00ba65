//! Code for creating the user table and fetching users from the database.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for the name a user logs in with.
///
/// The username doubles as the owner of the cash cards a user creates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new username.
    pub fn new(username: &str) -> Self {
        Self(username.to_owned())
    }

    /// The username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The role granted to a user.
///
/// Only [Role::CardOwner] may use the cash card API, any other role is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// May create and manage their own cash cards.
    CardOwner,
    /// Any other role, kept verbatim.
    Other(String),
}

impl Role {
    const CARD_OWNER: &'static str = "CARD-OWNER";

    /// Whether this role grants access to the cash card API.
    pub fn is_card_owner(&self) -> bool {
        matches!(self, Role::CardOwner)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case(Self::CARD_OWNER) {
            Role::CardOwner
        } else {
            Role::Other(value.to_owned())
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::CardOwner => f.write_str(Self::CARD_OWNER),
            Role::Other(role) => f.write_str(role),
        }
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The name the user logs in with.
    pub username: Username,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// What the user is allowed to do.
    pub role: Role,
}

impl User {
    /// Create a new user.
    pub fn new(username: Username, password_hash: PasswordHash, role: Role) -> Self {
        Self {
            username,
            password_hash,
            role,
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateUsername] if the username is already taken,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(user: &User, connection: &Connection) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO user (username, password, role) VALUES (?1, ?2, ?3)",
            (
                user.username.as_str(),
                user.password_hash.as_ref(),
                user.role.to_string(),
            ),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername(user.username.to_string())
            }
            error => error.into(),
        })?;

    Ok(())
}

/// Get the user from the database with the name `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT username, password, role FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_row_to_user)
        .map_err(|error| error.into())
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let username: String = row.get(0)?;
    let raw_password_hash: String = row.get(1)?;
    let raw_role: String = row.get(2)?;

    Ok(User::new(
        Username::new(&username),
        PasswordHash::new_unchecked(&raw_password_hash),
        Role::from(raw_role.as_str()),
    ))
}
