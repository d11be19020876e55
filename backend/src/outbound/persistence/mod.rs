//! Persistence adapters implementing the user repository port.

mod kv_user_repository;

pub use kv_user_repository::{DEFAULT_USERS_TABLE, KeyValueUserRepository, build_user_update};
