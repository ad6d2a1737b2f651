pub mod billboard;
pub mod seating;

pub use billboard::{Catalog, Concession, Movie, Room, Showtime};
pub use seating::{SeatError, SeatRegistry, SeatingChart};
