use async_trait::async_trait;

use crate::user::{User, UserUpdate};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("user not found: {0}")]
    NotFound(i64),

    #[error("store error: {0}")]
    Store(String),
}

/// Repository trait for account data access. The directory is the only
/// component allowed to set the password field, and it always hashes before
/// storing.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create an account. Uniqueness of the email is enforced by the backing
    /// store (unique constraint), not by a prior read, so two concurrent
    /// registrations of the same address cannot both succeed.
    async fn create(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DirectoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    /// Apply a typed update. Fields left as `None` are untouched.
    async fn update(&self, id: i64, changes: UserUpdate) -> Result<User, DirectoryError>;

    /// Check a login attempt against the stored hash. Never returns the hash.
    fn verify_password(&self, user: &User, attempt: &str) -> bool;
}
