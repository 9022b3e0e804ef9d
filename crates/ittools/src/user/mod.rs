//! User module.
//!
//! Principal records and the credential store the authentication core reads from.

mod models;
mod repository;
mod store;
mod validation;

pub use models::{NewUser, User, UserInfo, UserRole};
pub use repository::UserRepository;
pub use store::{CredentialStore, is_unique_violation};
pub use validation::{is_valid_email, is_valid_username, sanitize_username, username_from_email};
