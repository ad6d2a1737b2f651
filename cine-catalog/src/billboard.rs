use serde::{Deserialize, Serialize};

/// A movie on the billboard. Immutable reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub titulo: String,
    pub sinopsis: String,
    pub anio: i32,
    pub duracion_min: u32,
}

/// A scheduled screening of a movie in a specific room at a specific time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showtime {
    pub id: i64,
    pub movie_id: i64,
    /// Time of day, "HH:MM".
    pub hora: String,
    pub sala: String,
    /// Base ticket price for this screening.
    pub precio: f64,
}

/// A candy bar product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concession {
    pub id: i64,
    pub producto: String,
    pub precio: f64,
}

/// Physical room layout: rows `A..=last_row`, columns `1..=columns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub sala: String,
    pub last_row: char,
    pub columns: u32,
}

/// The full reference catalog: movies, their showtimes, the candy bar and the
/// room layouts. Built once at startup and shared read-only; there is no
/// mutation path after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Vec<Movie>,
    showtimes: Vec<Showtime>,
    concessions: Vec<Concession>,
    rooms: Vec<Room>,
}

impl Catalog {
    pub fn new(
        movies: Vec<Movie>,
        showtimes: Vec<Showtime>,
        concessions: Vec<Concession>,
        rooms: Vec<Room>,
    ) -> Self {
        Self {
            movies,
            showtimes,
            concessions,
            rooms,
        }
    }

    /// The billboard the cinema currently runs.
    pub fn seed() -> Self {
        let movies = vec![
            Movie {
                id: 1,
                titulo: "El Padrino".into(),
                sinopsis: "La historia de una familia de la mafia en Estados Unidos.".into(),
                anio: 1972,
                duracion_min: 175,
            },
            Movie {
                id: 2,
                titulo: "Inception".into(),
                sinopsis: "Un ladrón que roba secretos a través de los sueños.".into(),
                anio: 2010,
                duracion_min: 148,
            },
            Movie {
                id: 3,
                titulo: "Avatar".into(),
                sinopsis: "Un exmarine que se encuentra en el mundo alienígena de Pandora.".into(),
                anio: 2009,
                duracion_min: 162,
            },
            Movie {
                id: 4,
                titulo: "Titanic".into(),
                sinopsis: "Una historia de amor en el trasatlántico RMS Titanic.".into(),
                anio: 1997,
                duracion_min: 195,
            },
        ];

        let showtimes = vec![
            Showtime { id: 1, movie_id: 1, hora: "17:00".into(), sala: "1".into(), precio: 5.50 },
            Showtime { id: 2, movie_id: 1, hora: "21:30".into(), sala: "1".into(), precio: 6.00 },
            Showtime { id: 3, movie_id: 2, hora: "20:00".into(), sala: "2".into(), precio: 6.00 },
            Showtime { id: 4, movie_id: 3, hora: "18:00".into(), sala: "3".into(), precio: 7.50 },
            Showtime { id: 5, movie_id: 4, hora: "19:30".into(), sala: "1".into(), precio: 5.50 },
        ];

        let concessions = vec![
            Concession { id: 1, producto: "Palomitas Grandes".into(), precio: 4.50 },
            Concession { id: 2, producto: "Refresco 1L".into(), precio: 3.00 },
            Concession { id: 3, producto: "Chocolates".into(), precio: 2.50 },
        ];

        let rooms = vec![
            Room { sala: "1".into(), last_row: 'F', columns: 10 },
            Room { sala: "2".into(), last_row: 'F', columns: 10 },
            Room { sala: "3".into(), last_row: 'F', columns: 10 },
        ];

        Self::new(movies, showtimes, concessions, rooms)
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn movie(&self, id: i64) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    pub fn showtimes(&self) -> &[Showtime] {
        &self.showtimes
    }

    pub fn showtimes_for(&self, movie_id: i64) -> Vec<&Showtime> {
        self.showtimes
            .iter()
            .filter(|s| s.movie_id == movie_id)
            .collect()
    }

    pub fn showtime(&self, id: i64) -> Option<&Showtime> {
        self.showtimes.iter().find(|s| s.id == id)
    }

    pub fn concessions(&self) -> &[Concession] {
        &self.concessions
    }

    pub fn concession(&self, id: i64) -> Option<&Concession> {
        self.concessions.iter().find(|c| c.id == id)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, sala: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.sala == sala)
    }
}
