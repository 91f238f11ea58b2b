//! Application services sitting between the routes and the repositories.

pub mod auth;
pub mod storage;

pub use auth::{AuthService, AuthSession};
pub use storage::{StoredFile, UploadError, UploadStore};
