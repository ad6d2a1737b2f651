//! In-memory directory for tests and local development. It goes through the
//! same hashing entry point as the Postgres implementation and enforces the
//! same email uniqueness, so handler tests exercise the real contract
//! without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use cine_core::{DirectoryError, Sensitive, User, UserDirectory, UserUpdate};

use crate::password;

#[derive(Default)]
pub struct MemoryUserDirectory {
    inner: Mutex<Vec<User>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DirectoryError> {
        let hashed = password::hash_password(password)
            .map_err(|e| DirectoryError::Store(e.to_string()))?;

        let mut users = self.inner.lock().unwrap();
        // Uniqueness check and insert happen under the same lock, mirroring
        // the database unique constraint.
        if users.iter().any(|u| u.email == email) {
            return Err(DirectoryError::DuplicateEmail(email.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            nombre: nombre.to_string(),
            email: email.to_string(),
            password: Sensitive::new(hashed),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, id: i64, changes: UserUpdate) -> Result<User, DirectoryError> {
        let hashed = match changes.password.as_deref() {
            Some(plain) => Some(
                password::hash_password(plain)
                    .map_err(|e| DirectoryError::Store(e.to_string()))?,
            ),
            None => None,
        };

        let mut users = self.inner.lock().unwrap();

        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.email == *email && u.id != id) {
                return Err(DirectoryError::DuplicateEmail(email.clone()));
            }
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DirectoryError::NotFound(id))?;

        if let Some(nombre) = changes.nombre {
            user.nombre = nombre;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = hashed {
            user.password = Sensitive::new(hash);
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    fn verify_password(&self, user: &User, attempt: &str) -> bool {
        password::verify_password(attempt, user.password.expose())
    }
}
