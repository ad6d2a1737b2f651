use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use uuid::Uuid;

use crate::cart::Cart;

/// One rendered line of a receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub tipo: String,
    pub descripcion: String,
    pub cantidad: u32,
    pub precio_unitario: f64,
}

/// Immutable snapshot of a cart at checkout time. Once created it never
/// changes; rendering the same receipt twice yields byte-identical output.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub id: Uuid,
    lines: Vec<ReceiptLine>,
    total: f64,
    fecha: DateTime<Utc>,
}

impl Receipt {
    pub fn new(cart: &Cart, fecha: DateTime<Utc>) -> Self {
        let lines = cart
            .items()
            .iter()
            .map(|item| ReceiptLine {
                tipo: item.kind_label().to_string(),
                descripcion: item.descripcion().to_string(),
                cantidad: item.cantidad(),
                precio_unitario: item.precio_unitario(),
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            lines,
            total: cart.total(),
            fecha,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn fecha(&self) -> DateTime<Utc> {
        self.fecha
    }

    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Render the ticket text, items in insertion order.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("--- Ticket de Compra ---\n");
        let _ = writeln!(out, "Fecha: {}\n", self.fecha.format("%Y-%m-%d %H:%M:%S"));

        for line in &self.lines {
            let _ = writeln!(out, "{}: {}", line.tipo, line.descripcion);
            let _ = writeln!(
                out,
                "Cantidad: {} - Precio unitario: ${:.2}",
                line.cantidad, line.precio_unitario
            );
            let _ = writeln!(
                out,
                "Subtotal: ${:.2}\n",
                f64::from(line.cantidad) * line.precio_unitario
            );
        }

        let _ = write!(out, "TOTAL A PAGAR: ${:.2}", self.total);
        out
    }
}
