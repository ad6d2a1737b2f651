use cine_catalog::{Concession, Movie, Showtime};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    #[error("unit price must not be negative, got {0}")]
    InvalidPrice(f64),
}

/// A line in the cart, either a batch of tickets for one showtime or a candy
/// bar product.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum CartItem {
    Ticket {
        showtime_id: i64,
        descripcion: String,
        asientos: Vec<String>,
        cantidad: u32,
        precio_unitario: f64,
    },
    Concession {
        descripcion: String,
        cantidad: u32,
        precio_unitario: f64,
    },
}

impl CartItem {
    pub fn kind_label(&self) -> &'static str {
        match self {
            CartItem::Ticket { .. } => "Boleto",
            CartItem::Concession { .. } => "Snack",
        }
    }

    pub fn descripcion(&self) -> &str {
        match self {
            CartItem::Ticket { descripcion, .. } => descripcion,
            CartItem::Concession { descripcion, .. } => descripcion,
        }
    }

    pub fn cantidad(&self) -> u32 {
        match self {
            CartItem::Ticket { cantidad, .. } => *cantidad,
            CartItem::Concession { cantidad, .. } => *cantidad,
        }
    }

    pub fn precio_unitario(&self) -> f64 {
        match self {
            CartItem::Ticket { precio_unitario, .. } => *precio_unitario,
            CartItem::Concession { precio_unitario, .. } => *precio_unitario,
        }
    }

    /// Unrounded line subtotal. Rounding happens once, at summation.
    pub fn subtotal(&self) -> f64 {
        f64::from(self.cantidad()) * self.precio_unitario()
    }
}

/// Accumulates line items for one session. The cart is session-confined and
/// never shared, so it needs no synchronization of its own; callers must have
/// reserved seats *before* adding a ticket line (reserve-before-add).
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a ticket line for already-reserved seats. The quantity is the
    /// number of seats; the unit price comes from the showtime.
    pub fn add_ticket(
        &mut self,
        movie: &Movie,
        showtime: &Showtime,
        asientos: Vec<String>,
    ) -> Result<(), CartError> {
        let cantidad = asientos.len() as u32;
        if cantidad == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        if showtime.precio < 0.0 {
            return Err(CartError::InvalidPrice(showtime.precio));
        }

        self.items.push(CartItem::Ticket {
            showtime_id: showtime.id,
            descripcion: format!("{} - {}", movie.titulo, showtime.hora),
            asientos,
            cantidad,
            precio_unitario: showtime.precio,
        });
        Ok(())
    }

    pub fn add_concession(&mut self, product: &Concession, cantidad: u32) -> Result<(), CartError> {
        if cantidad == 0 {
            return Err(CartError::InvalidQuantity(cantidad));
        }
        if product.precio < 0.0 {
            return Err(CartError::InvalidPrice(product.precio));
        }

        self.items.push(CartItem::Concession {
            descripcion: product.producto.clone(),
            cantidad,
            precio_unitario: product.precio,
        });
        Ok(())
    }

    /// Grand total. Line subtotals are summed unrounded and the sum is
    /// rounded to two decimals once, so the result cannot drift with the
    /// number of lines or their insertion order.
    pub fn total(&self) -> f64 {
        let sum: f64 = self.items.iter().map(CartItem::subtotal).sum();
        (sum * 100.0).round() / 100.0
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Empty the cart after checkout or explicit abandonment.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
