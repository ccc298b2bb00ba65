mod authenticator;
mod middleware;
mod password;
mod user;

pub use authenticator::{Authenticator, InMemoryUsers, SQLiteUsers, demo_users};
pub use middleware::auth_guard;
pub use password::PasswordHash;
pub use user::{Role, User, Username, create_user, create_user_table};

#[cfg(test)]
pub use middleware::AuthState;
