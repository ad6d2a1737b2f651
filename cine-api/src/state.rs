use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use cine_catalog::{Catalog, SeatRegistry};
use cine_core::UserDirectory;
use cine_notify::Mailer;
use cine_order::Cart;

/// What one browsing session has picked so far. The cart is confined to its
/// session; only the seat registry is shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub cart: Cart,
    pub pending: Option<PendingSelection>,
}

/// Showtime and ticket count chosen on /comprar, waiting for the seat pick.
#[derive(Debug, Clone, Copy)]
pub struct PendingSelection {
    pub showtime_id: i64,
    pub cantidad: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub seats: Arc<SeatRegistry>,
    pub sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    pub users: Arc<dyn UserDirectory>,
    pub notifier: Arc<dyn Mailer>,
    /// Session signing secret from configuration; reserved for cookie-based
    /// sessions, carried here so it is injected rather than read ad hoc.
    pub session_secret: Arc<String>,
}
