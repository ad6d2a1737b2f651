use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use cine_api::{app, state::AppState};
use cine_catalog::{Catalog, SeatRegistry};
use cine_notify::{Notifier, SmtpSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cine_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fails here if SMTP credentials or the session secret are missing; the
    // server never starts with a fallback credential.
    let config = cine_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Planet Cinema API on port {}", config.server.port);

    let db = cine_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let notifier = Notifier::new(&SmtpSettings {
        host: config.smtp.host.clone(),
        port: config.smtp.port,
        username: config.smtp.username.clone(),
        password: config.smtp.password.clone(),
        from: config.smtp.from.clone(),
        timeout_seconds: config.smtp.timeout_seconds,
    })
    .expect("Failed to build SMTP notifier");

    let catalog = Arc::new(Catalog::seed());
    let seats = Arc::new(SeatRegistry::for_catalog(&catalog));

    let app_state = AppState {
        catalog,
        seats,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        users: Arc::new(cine_store::PgUserDirectory::new(db.pool.clone())),
        notifier: Arc::new(notifier),
        session_secret: Arc::new(config.session.secret.clone()),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
