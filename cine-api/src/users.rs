use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use cine_core::User;

use crate::{error::AppError, state::AppState};

/// All three registration fields are required; they arrive as options so a
/// missing field yields a 400 with a message instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct RegistroRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user. The password hash never appears here.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub nombre: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nombre: user.nombre,
            email: user.email,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/registro", post(registro))
        .route("/api/usuario/", post(registro))
        .route("/api/usuario/{id}", get(obtener_usuario))
}

async fn registro(
    State(state): State<AppState>,
    Json(req): Json<RegistroRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (nombre, email, password) = match (req.nombre, req.email, req.password) {
        (Some(n), Some(e), Some(p)) => (n, e, p),
        _ => {
            return Err(AppError::ValidationError(
                "Faltan datos requeridos".into(),
            ))
        }
    };

    if nombre.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AppError::ValidationError("Faltan datos requeridos".into()));
    }
    cine_notify::validate_address(&email)
        .map_err(|_| AppError::ValidationError(format!("Email inválido: {}", email)))?;

    let user = state.users.create(&nombre, &email, &password).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn obtener_usuario(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Usuario no encontrado: {}", id)))?;

    Ok(Json(user.into()))
}
