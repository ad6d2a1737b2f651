use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cine_api::{app, AppState};
use cine_catalog::{Catalog, SeatRegistry};
use cine_core::UserDirectory;
use cine_notify::{DeliveryError, Mailer};
use cine_store::MemoryUserDirectory;

/// In-memory mailer: records every destination it was asked to reach, and
/// can be told to fail like an unreachable relay would.
struct StubMailer {
    fail: bool,
    sent: Mutex<Vec<String>>,
}

impl StubMailer {
    fn delivering() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn deliveries(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for StubMailer {
    fn send(&self, destination: &str, _subject: &str, _body: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::DeliveryFailed("relay unreachable".into()));
        }
        self.sent.lock().unwrap().push(destination.to_string());
        Ok(())
    }
}

fn test_app() -> (Router, Arc<MemoryUserDirectory>) {
    test_app_with_mailer(StubMailer::delivering())
}

fn test_app_with_mailer(mailer: Arc<StubMailer>) -> (Router, Arc<MemoryUserDirectory>) {
    let directory = Arc::new(MemoryUserDirectory::new());
    let catalog = Arc::new(Catalog::seed());
    let seats = Arc::new(SeatRegistry::for_catalog(&catalog));

    let state = AppState {
        catalog,
        seats,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        users: directory.clone(),
        notifier: mailer,
        session_secret: Arc::new("test-secret".into()),
    };

    (app(state), directory)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn billboard_lists_movies_and_detail() {
    let (app, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/cartelera", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (status, body) = send(&app, Method::GET, "/pelicula/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["titulo"], "Inception");
    assert!(!body["funciones"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, "/pelicula/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no encontrada"));
}

#[tokio::test]
async fn register_then_duplicate_email() {
    let (app, directory) = test_app();

    let payload = json!({ "nombre": "Ana", "email": "ana@x.com", "password": "secret" });
    let (status, body) = send(&app, Method::POST, "/api/registro", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["nombre"], "Ana");
    assert_eq!(body["email"], "ana@x.com");
    // The response never carries the password in any form.
    assert!(body.get("password").is_none());

    // The stored representation is a hash, not the plaintext.
    let stored = directory.find_by_email("ana@x.com").await.unwrap().unwrap();
    assert_ne!(stored.password.expose(), "secret");

    let (status, body) = send(&app, Method::POST, "/api/registro", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ana@x.com"));
    assert_eq!(directory.len(), 1);
}

#[tokio::test]
async fn register_with_missing_fields() {
    let (app, directory) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/usuario/",
        Some(json!({ "nombre": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Faltan datos requeridos");
    assert!(directory.is_empty());
}

#[tokio::test]
async fn fetch_user_by_id() {
    let (app, _) = test_app();

    let payload = json!({ "nombre": "Ana", "email": "ana@x.com", "password": "secret" });
    let (status, body) = send(&app, Method::POST, "/api/usuario/", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/usuario/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@x.com");

    let (status, _) = send(&app, Method::GET, "/api/usuario/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Drives the whole web purchase flow: pick a showtime, reserve seats,
/// observe availability shrink, collide with a second session, cancel.
#[tokio::test]
async fn purchase_flow_reserves_and_releases_seats() {
    let (app, _) = test_app();

    // Showtime 1 (room 1, A-F x 10) starts with 60 free seats.
    let (status, body) = send(
        &app,
        Method::GET,
        "/seleccionar_asientos?showtime_id=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disponibles"].as_array().unwrap().len(), 60);
    assert_eq!(body["disponibles"][0], "A1");

    let (status, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["A1", "A2"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 2 tickets at the showtime's base price of 5.50.
    assert_eq!(body["total"], 11.0);

    let (_, body) = send(
        &app,
        Method::GET,
        "/seleccionar_asientos?showtime_id=1",
        None,
    )
    .await;
    assert_eq!(body["disponibles"].as_array().unwrap().len(), 58);

    // A second session asking for an overlapping seat set conflicts.
    let (status, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let other_session = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": other_session, "showtime_id": 1, "asientos": ["A2", "A3"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The conflicting request reserved nothing.
    let (_, body) = send(
        &app,
        Method::GET,
        "/seleccionar_asientos?showtime_id=1",
        None,
    )
    .await;
    assert_eq!(body["disponibles"].as_array().unwrap().len(), 58);

    // Cancelling the first session frees its seats again.
    let (status, body) = send(
        &app,
        Method::POST,
        "/cancelar",
        Some(json!({ "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asientos_liberados"], 2);

    let (_, body) = send(
        &app,
        Method::GET,
        "/seleccionar_asientos?showtime_id=1",
        None,
    )
    .await;
    assert_eq!(body["disponibles"].as_array().unwrap().len(), 60);
}

#[tokio::test]
async fn unknown_seat_label_is_a_conflict() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // G1 is outside the A-F room layout.
    let (status, body) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["G1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("G1"));
}

#[tokio::test]
async fn repeated_seat_label_is_a_bad_request() {
    let (app, _) = test_app();

    let (_, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 2 })),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Two tickets, but the same seat named twice.
    let (status, body) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["A1", "A1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("A1"));

    // Nothing was reserved and nothing was charged.
    let (_, body) = send(
        &app,
        Method::GET,
        "/seleccionar_asientos?showtime_id=1",
        None,
    )
    .await;
    assert_eq!(body["disponibles"].as_array().unwrap().len(), 60);
}

#[tokio::test]
async fn seat_count_must_match_the_selection() {
    let (app, _) = test_app();

    let (_, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 3 })),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["A1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comprar_validates_movie_and_quantity() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Showtime 3 belongs to movie 2, not movie 1.
    let (status, _) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 3, "cantidad": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/comprar/99",
        Some(json!({ "showtime_id": 1, "cantidad": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_rejects_bad_address_and_keeps_the_cart() {
    let (app, _) = test_app();

    let (_, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 1 })),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["F10"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Invalid address fails fast, before any relay connection.
    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(json!({ "session_id": session_id, "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-an-email"));

    // The cart survived: cancelling still releases the reserved seat.
    let (status, body) = send(
        &app,
        Method::POST,
        "/cancelar",
        Some(json!({ "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asientos_liberados"], 1);
}

#[tokio::test]
async fn relay_failure_keeps_the_cart_for_a_retry() {
    let (app, _) = test_app_with_mailer(StubMailer::failing());

    let (_, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 1 })),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["B5"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The address is fine; the relay is not. The client is told to retry.
    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(json!({ "session_id": session_id, "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("su carrito se conserva"));

    // The session and its cart survived: cancelling still frees the seat.
    let (status, body) = send(
        &app,
        Method::POST,
        "/cancelar",
        Some(json!({ "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asientos_liberados"], 1);
}

#[tokio::test]
async fn successful_checkout_closes_the_session() {
    let mailer = StubMailer::delivering();
    let (app, _) = test_app_with_mailer(mailer.clone());

    let (_, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 1 })),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/seleccionar_asientos",
        Some(json!({ "session_id": session_id, "showtime_id": 1, "asientos": ["C7"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(json!({ "session_id": session_id, "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5.5);
    assert!(body["recibo"].as_str().unwrap().contains("TOTAL A PAGAR"));
    assert_eq!(mailer.deliveries(), vec!["ana@x.com".to_string()]);

    // The sold seat stays reserved after the session is gone.
    let (_, body) = send(
        &app,
        Method::GET,
        "/seleccionar_asientos?showtime_id=1",
        None,
    )
    .await;
    assert_eq!(body["disponibles"].as_array().unwrap().len(), 59);

    // The session was closed; it cannot be cancelled or checked out again.
    let (status, body) = send(
        &app,
        Method::POST,
        "/cancelar",
        Some(json!({ "session_id": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Sesión"));
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() {
    let (app, _) = test_app();

    let (_, body) = send(
        &app,
        Method::POST,
        "/comprar/1",
        Some(json!({ "showtime_id": 1, "cantidad": 1 })),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout",
        Some(json!({ "session_id": session_id, "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("vacío"));
}
