use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cine_core::{DirectoryError, Sensitive, User, UserDirectory, UserUpdate};

use crate::password;

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    nombre: String,
    email: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            nombre: row.nombre,
            email: row.email,
            password: Sensitive::new(row.password),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, nombre, email, password, created_at, updated_at";

fn map_sqlx_error(email: &str, err: sqlx::Error) -> DirectoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DirectoryError::DuplicateEmail(email.to_string())
        }
        _ => DirectoryError::Store(err.to_string()),
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn create(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DirectoryError> {
        let hashed = password::hash_password(password)
            .map_err(|e| DirectoryError::Store(e.to_string()))?;

        // The unique constraint on usuarios.email is the arbiter here; no
        // read-then-write check, so concurrent registrations cannot race.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO usuarios (nombre, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(nombre)
        .bind(email)
        .bind(&hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(email, e))?;

        tracing::info!(user = row.id, "user registered");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM usuarios WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Store(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM usuarios WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Store(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, id: i64, changes: UserUpdate) -> Result<User, DirectoryError> {
        // Only the fields UserUpdate enumerates can ever reach this query;
        // a password change goes through the hashing entry point first.
        let hashed = match changes.password.as_deref() {
            Some(plain) => Some(
                password::hash_password(plain)
                    .map_err(|e| DirectoryError::Store(e.to_string()))?,
            ),
            None => None,
        };

        let email_for_error = changes.email.clone().unwrap_or_default();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE usuarios
             SET nombre = COALESCE($2, nombre),
                 email = COALESCE($3, email),
                 password = COALESCE($4, password),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(changes.nombre)
        .bind(changes.email)
        .bind(hashed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(&email_for_error, e))?;

        row.map(Into::into).ok_or(DirectoryError::NotFound(id))
    }

    fn verify_password(&self, user: &User, attempt: &str) -> bool {
        password::verify_password(attempt, user.password.expose())
    }
}
