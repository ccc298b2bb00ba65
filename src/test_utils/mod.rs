//! Helpers shared by the tests of different modules.

mod http;

pub(crate) use http::{basic_auth, get_test_server, must_create_test_connection};
