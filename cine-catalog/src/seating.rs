use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use crate::billboard::Catalog;

#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("unknown showtime: {0}")]
    UnknownShowtime(i64),

    #[error("seat does not exist in this room: {0}")]
    UnknownSeat(String),

    #[error("seat requested more than once: {0}")]
    DuplicateSeat(String),

    #[error("seat already taken: {0}")]
    AlreadyTaken(String),
}

/// The valid seat labels of a room, row-major: `A1..A{N}, B1..B{N}, ...`.
/// Generation is pure and deterministic; labels are unique by construction.
#[derive(Debug, Clone)]
pub struct SeatingChart {
    labels: Vec<String>,
    lookup: HashSet<String>,
}

impl SeatingChart {
    pub fn generate(last_row: char, columns: u32) -> Self {
        let mut labels = Vec::new();
        for row in 'A'..=last_row {
            for column in 1..=columns {
                labels.push(format!("{}{}", row, column));
            }
        }
        let lookup = labels.iter().cloned().collect();
        Self { labels, lookup }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.lookup.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Tracks which seats are taken per showtime. The chart map is immutable
/// after construction; reservation state lives behind a lock so overlapping
/// concurrent requests are serialized and cannot both win the same seat.
///
/// Seats are never released implicitly. Cancelling an order has to call
/// [`SeatRegistry::release`] with the labels it previously reserved.
pub struct SeatRegistry {
    charts: HashMap<i64, SeatingChart>,
    reserved: Mutex<HashMap<i64, BTreeSet<String>>>,
}

impl SeatRegistry {
    pub fn new(charts: HashMap<i64, SeatingChart>) -> Self {
        Self {
            charts,
            reserved: Mutex::new(HashMap::new()),
        }
    }

    /// Build a registry covering every showtime in the catalog, using the
    /// layout of the room each screening runs in.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        let mut charts = HashMap::new();
        for showtime in catalog.showtimes() {
            if let Some(room) = catalog.room(&showtime.sala) {
                charts.insert(
                    showtime.id,
                    SeatingChart::generate(room.last_row, room.columns),
                );
            } else {
                tracing::warn!(showtime = showtime.id, sala = %showtime.sala, "showtime references unknown room, no seats generated");
            }
        }
        Self::new(charts)
    }

    /// Reserve every requested seat for a showtime, all-or-nothing. The
    /// request is a set: a label repeated within one call is rejected, so a
    /// reservation always covers exactly as many seats as it pays for. If
    /// any label is invalid or already taken, nothing from this call is
    /// reserved.
    pub fn reserve(&self, showtime_id: i64, labels: &[String]) -> Result<(), SeatError> {
        let chart = self
            .charts
            .get(&showtime_id)
            .ok_or(SeatError::UnknownShowtime(showtime_id))?;

        let mut requested: BTreeSet<&str> = BTreeSet::new();
        for label in labels {
            if !chart.contains(label) {
                return Err(SeatError::UnknownSeat(label.clone()));
            }
            if !requested.insert(label.as_str()) {
                return Err(SeatError::DuplicateSeat(label.clone()));
            }
        }

        let mut reserved = self.reserved.lock().unwrap();
        let taken = reserved.entry(showtime_id).or_default();

        // Check the whole request before touching anything.
        for label in labels {
            if taken.contains(label) {
                return Err(SeatError::AlreadyTaken(label.clone()));
            }
        }

        for label in labels {
            taken.insert(label.clone());
        }

        tracing::debug!(showtime = showtime_id, seats = ?labels, "seats reserved");
        Ok(())
    }

    /// Seats not yet reserved for a showtime, in chart (row-major) order.
    pub fn available(&self, showtime_id: i64) -> Result<Vec<String>, SeatError> {
        let chart = self
            .charts
            .get(&showtime_id)
            .ok_or(SeatError::UnknownShowtime(showtime_id))?;

        let reserved = self.reserved.lock().unwrap();
        let taken = reserved.get(&showtime_id);

        Ok(chart
            .labels()
            .iter()
            .filter(|label| taken.map_or(true, |t| !t.contains(*label)))
            .cloned()
            .collect())
    }

    /// Free previously reserved seats, e.g. when a cart is abandoned.
    /// Labels that were not reserved are ignored.
    pub fn release(&self, showtime_id: i64, labels: &[String]) -> Result<(), SeatError> {
        if !self.charts.contains_key(&showtime_id) {
            return Err(SeatError::UnknownShowtime(showtime_id));
        }

        let mut reserved = self.reserved.lock().unwrap();
        if let Some(taken) = reserved.get_mut(&showtime_id) {
            for label in labels {
                taken.remove(label);
            }
        }

        tracing::debug!(showtime = showtime_id, seats = ?labels, "seats released");
        Ok(())
    }
}
