use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use cine_catalog::{Movie, Showtime};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub pelicula: Movie,
    pub funciones: Vec<Showtime>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/cartelera", get(cartelera))
        .route("/pelicula/{id}", get(pelicula))
}

async fn welcome() -> Json<Value> {
    Json(json!({ "mensaje": "Bienvenido a Planet Cinema" }))
}

async fn cartelera(State(state): State<AppState>) -> Json<Vec<Movie>> {
    Json(state.catalog.movies().to_vec())
}

async fn pelicula(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MovieDetailResponse>, AppError> {
    let movie = state
        .catalog
        .movie(id)
        .ok_or_else(|| AppError::NotFoundError(format!("Película no encontrada: {}", id)))?;

    let funciones = state
        .catalog
        .showtimes_for(id)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(MovieDetailResponse {
        pelicula: movie.clone(),
        funciones,
    }))
}
