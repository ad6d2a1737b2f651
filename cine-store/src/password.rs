//! The single hashing entry point for account passwords. Everything that
//! stores a password goes through here; nothing else in the workspace links
//! against bcrypt.

use bcrypt::{hash, verify, DEFAULT_COST};

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(attempt: &str, stored_hash: &str) -> bool {
    verify(attempt, stored_hash).unwrap_or(false)
}
