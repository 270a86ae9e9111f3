//! Password hashing and bearer token handling.

mod password;
mod token;

pub use password::{hash_password, verify_password, DUMMY_HASH};
pub use token::{decode_token, issue_token, Claims};
