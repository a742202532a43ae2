//! Repository traits for metadata operations.

pub mod api_keys;
pub mod users;

pub use api_keys::ApiKeyRepo;
pub use users::UserRepo;
