use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cine_catalog::Showtime;
use cine_notify::Mailer;
use cine_order::{CartItem, Receipt};

use crate::{
    error::AppError,
    state::{AppState, PendingSelection, Session},
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CompraRequest {
    pub session_id: Option<Uuid>,
    pub showtime_id: i64,
    pub cantidad: u32,
}

#[derive(Debug, Serialize)]
pub struct CompraResponse {
    pub session_id: Uuid,
    pub funcion: Showtime,
    pub cantidad: u32,
    pub asientos_disponibles: usize,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub showtime_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub showtime_id: i64,
    pub disponibles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeleccionRequest {
    pub session_id: Uuid,
    pub showtime_id: i64,
    pub asientos: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeleccionResponse {
    pub mensaje: String,
    pub asientos: Vec<String>,
    pub total: f64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub session_id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub mensaje: String,
    pub total: f64,
    pub recibo: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub mensaje: String,
    pub asientos_liberados: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comprar/{movie_id}", get(funciones).post(comprar))
        .route(
            "/seleccionar_asientos",
            get(asientos_disponibles).post(seleccionar_asientos),
        )
        .route("/checkout", post(checkout))
        .route("/cancelar", post(cancelar))
}

// ============================================================================
// Handlers
// ============================================================================

/// Showtimes on offer for one movie.
async fn funciones(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Vec<Showtime>>, AppError> {
    if state.catalog.movie(movie_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Película no encontrada: {}",
            movie_id
        )));
    }

    Ok(Json(
        state
            .catalog
            .showtimes_for(movie_id)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

/// Pick a showtime and ticket count. Opens a session when the client does not
/// have one yet; the actual cart mutation happens at seat selection.
async fn comprar(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Json(req): Json<CompraRequest>,
) -> Result<Json<CompraResponse>, AppError> {
    if state.catalog.movie(movie_id).is_none() {
        return Err(AppError::NotFoundError(format!(
            "Película no encontrada: {}",
            movie_id
        )));
    }

    if req.cantidad == 0 {
        return Err(AppError::ValidationError(
            "La cantidad de boletos debe ser al menos 1".into(),
        ));
    }

    let showtime = state
        .catalog
        .showtime(req.showtime_id)
        .ok_or_else(|| {
            AppError::NotFoundError(format!("Función no encontrada: {}", req.showtime_id))
        })?
        .clone();

    if showtime.movie_id != movie_id {
        return Err(AppError::ValidationError(format!(
            "La función {} no corresponde a la película {}",
            showtime.id, movie_id
        )));
    }

    let disponibles = state.seats.available(showtime.id)?.len();

    let session_id = req.session_id.unwrap_or_else(Uuid::new_v4);
    {
        let mut sessions = state.sessions.lock().unwrap();
        let session = sessions.entry(session_id).or_insert_with(Session::default);
        session.pending = Some(PendingSelection {
            showtime_id: showtime.id,
            cantidad: req.cantidad,
        });
    }

    tracing::debug!(%session_id, showtime = showtime.id, cantidad = req.cantidad, "showtime selected");

    Ok(Json(CompraResponse {
        session_id,
        funcion: showtime,
        cantidad: req.cantidad,
        asientos_disponibles: disponibles,
    }))
}

async fn asientos_disponibles(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let disponibles = state.seats.available(query.showtime_id)?;
    Ok(Json(AvailabilityResponse {
        showtime_id: query.showtime_id,
        disponibles,
    }))
}

/// Reserve the requested seats and append the ticket line to the session
/// cart. Reservation happens first (reserve-before-add); if the cart rejects
/// the line, the reservation is rolled back so the two steps commit together.
async fn seleccionar_asientos(
    State(state): State<AppState>,
    Json(req): Json<SeleccionRequest>,
) -> Result<Json<SeleccionResponse>, AppError> {
    let showtime = state
        .catalog
        .showtime(req.showtime_id)
        .ok_or_else(|| {
            AppError::NotFoundError(format!("Función no encontrada: {}", req.showtime_id))
        })?
        .clone();
    let movie = state
        .catalog
        .movie(showtime.movie_id)
        .ok_or_else(|| AppError::InternalServerError("Función sin película asociada".into()))?
        .clone();

    {
        let sessions = state.sessions.lock().unwrap();
        let session = sessions.get(&req.session_id).ok_or_else(|| {
            AppError::ValidationError("Sesión desconocida, seleccione una función primero".into())
        })?;

        let pending = session.pending.ok_or_else(|| {
            AppError::ValidationError("Seleccione una función antes de elegir asientos".into())
        })?;

        if pending.showtime_id != req.showtime_id {
            return Err(AppError::ValidationError(format!(
                "La sesión tiene pendiente la función {}, no la {}",
                pending.showtime_id, req.showtime_id
            )));
        }
        if pending.cantidad as usize != req.asientos.len() {
            return Err(AppError::ValidationError(format!(
                "Se esperaban {} asientos, se recibieron {}",
                pending.cantidad,
                req.asientos.len()
            )));
        }
    }

    state.seats.reserve(req.showtime_id, &req.asientos)?;

    let total = {
        let mut sessions = state.sessions.lock().unwrap();
        let session = sessions.entry(req.session_id).or_default();

        if let Err(err) = session
            .cart
            .add_ticket(&movie, &showtime, req.asientos.clone())
        {
            // Keep reserve+add atomic: free the seats we just took.
            let _ = state.seats.release(req.showtime_id, &req.asientos);
            return Err(err.into());
        }
        session.pending = None;
        session.cart.total()
    };

    Ok(Json(SeleccionResponse {
        mensaje: "Asientos reservados".into(),
        asientos: req.asientos,
        total,
    }))
}

/// Finalize the purchase: render the receipt and email it. The cart is only
/// cleared after delivery succeeds; on failure it is preserved so the client
/// can retry.
async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    // Fail fast on a bad address before rendering or connecting anywhere.
    cine_notify::validate_address(&req.email)?;

    let cart = {
        let sessions = state.sessions.lock().unwrap();
        let session = sessions
            .get(&req.session_id)
            .ok_or_else(|| AppError::ValidationError("Sesión desconocida".into()))?;
        if session.cart.is_empty() {
            return Err(AppError::ValidationError("El carrito está vacío".into()));
        }
        session.cart.clone()
    };

    let receipt = Receipt::new(&cart, Utc::now());
    let body = receipt.render();

    let notifier = state.notifier.clone();
    let email = req.email.clone();
    let rendered = body.clone();
    tokio::task::spawn_blocking(move || {
        notifier.send(&email, "Tu ticket de compra - Planet Cinema", &rendered)
    })
    .await
    .map_err(|e| AppError::InternalServerError(e.to_string()))??;

    // The purchase is complete: drop the session entirely so it cannot be
    // checked out again or linger in memory. Sold seats stay reserved.
    {
        let mut sessions = state.sessions.lock().unwrap();
        sessions.remove(&req.session_id);
    }

    tracing::info!(%req.session_id, total = receipt.total(), "purchase completed");

    Ok(Json(CheckoutResponse {
        mensaje: format!("Ticket enviado a {}", req.email),
        total: receipt.total(),
        recibo: body,
    }))
}

/// Abandon the session: free every seat its cart reserved, then drop it.
async fn cancelar(
    State(state): State<AppState>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, AppError> {
    let session = {
        let mut sessions = state.sessions.lock().unwrap();
        sessions
            .remove(&req.session_id)
            .ok_or_else(|| AppError::ValidationError("Sesión desconocida".into()))?
    };

    let mut liberados = 0;
    for item in session.cart.items() {
        if let CartItem::Ticket {
            showtime_id,
            asientos,
            ..
        } = item
        {
            state.seats.release(*showtime_id, asientos)?;
            liberados += asientos.len();
        }
    }

    tracing::debug!(%req.session_id, liberados, "session cancelled");

    Ok(Json(CancelResponse {
        mensaje: "Compra cancelada".into(),
        asientos_liberados: liberados,
    }))
}
