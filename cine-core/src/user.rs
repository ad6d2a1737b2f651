use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sensitive::Sensitive;

/// A registered account. The password field holds the bcrypt hash, never the
/// plaintext, and is excluded from serialization so API responses cannot
/// carry it by accident.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: Sensitive<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Explicit set of mutable profile fields. Anything not listed here cannot be
/// updated through the directory; a `Some` password is re-hashed by the
/// directory before it is stored.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.email.is_none() && self.password.is_none()
    }
}
