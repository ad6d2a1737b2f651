//! Interactive box-office console: browse the billboard and the candy bar,
//! pick seats, and email the receipt. Same domain crates as the HTTP server,
//! driven from stdin instead of axum.

use std::io::{self, Write};

use anyhow::Context;
use chrono::Utc;
use cine_catalog::{Catalog, SeatRegistry};
use cine_notify::{DeliveryError, Notifier, SmtpSettings};
use cine_order::{Cart, Receipt};

fn main() -> anyhow::Result<()> {
    let config = cine_store::app_config::Config::load()
        .context("configuración incompleta (¿faltan las credenciales SMTP?)")?;

    let notifier = Notifier::new(&SmtpSettings {
        host: config.smtp.host.clone(),
        port: config.smtp.port,
        username: config.smtp.username.clone(),
        password: config.smtp.password.clone(),
        from: config.smtp.from.clone(),
        timeout_seconds: config.smtp.timeout_seconds,
    })
    .map_err(|e| anyhow::anyhow!("no se pudo preparar el correo: {}", e))?;

    let catalog = Catalog::seed();
    let seats = SeatRegistry::for_catalog(&catalog);
    let mut cart = Cart::new();

    loop {
        println!("\n1. Comprar boletos");
        println!("2. Ir a la caramelería");
        println!("3. Finalizar compra");
        println!("4. Salir");

        match prompt("Seleccione una opción: ")?.as_str() {
            "1" => {
                if let Err(e) = agregar_boletos(&catalog, &seats, &mut cart) {
                    println!("{}", e);
                }
            }
            "2" => {
                if let Err(e) = agregar_snacks(&catalog, &mut cart) {
                    println!("{}", e);
                }
            }
            "3" => finalizar_compra(&notifier, &mut cart)?,
            "4" => break,
            _ => println!("Opción inválida"),
        }
    }

    Ok(())
}

fn agregar_boletos(
    catalog: &Catalog,
    seats: &SeatRegistry,
    cart: &mut Cart,
) -> anyhow::Result<()> {
    println!("\n--- Cartelera del Cine ---");
    for showtime in catalog.showtimes() {
        let movie = catalog
            .movie(showtime.movie_id)
            .map(|m| m.titulo.as_str())
            .unwrap_or("?");
        println!(
            "{}. {} - {} - Sala {} - ${:.2}",
            showtime.id, movie, showtime.hora, showtime.sala, showtime.precio
        );
    }

    let showtime_id: i64 = prompt("\nSeleccione una función (número): ")?
        .parse()
        .map_err(|_| anyhow::anyhow!("Entrada inválida"))?;
    let showtime = catalog
        .showtime(showtime_id)
        .ok_or_else(|| anyhow::anyhow!("Opción inválida"))?;
    let movie = catalog
        .movie(showtime.movie_id)
        .ok_or_else(|| anyhow::anyhow!("Opción inválida"))?;

    let disponibles = seats.available(showtime.id)?;
    println!(
        "Asientos libres ({}): {}",
        disponibles.len(),
        disponibles
            .iter()
            .take(12)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );

    let raw = prompt("Asientos (separados por coma, ej. A1,A2): ")?;
    let asientos: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if asientos.is_empty() {
        anyhow::bail!("Entrada inválida");
    }

    seats.reserve(showtime.id, &asientos)?;
    if let Err(e) = cart.add_ticket(movie, showtime, asientos.clone()) {
        // Reserva y carrito se confirman juntos.
        let _ = seats.release(showtime.id, &asientos);
        anyhow::bail!("{}", e);
    }

    println!("¡Boletos agregados!");
    Ok(())
}

fn agregar_snacks(catalog: &Catalog, cart: &mut Cart) -> anyhow::Result<()> {
    println!("\n--- Caramelería ---");
    for product in catalog.concessions() {
        println!("{}. {} - ${:.2}", product.id, product.producto, product.precio);
    }

    let id: i64 = prompt("\nSeleccione un producto (número): ")?
        .parse()
        .map_err(|_| anyhow::anyhow!("Entrada inválida"))?;
    let product = catalog
        .concession(id)
        .ok_or_else(|| anyhow::anyhow!("Opción inválida"))?;

    let cantidad: u32 = prompt("Cantidad: ")?
        .parse()
        .map_err(|_| anyhow::anyhow!("Entrada inválida"))?;

    cart.add_concession(product, cantidad)?;
    println!("¡Producto agregado!");
    Ok(())
}

fn finalizar_compra(notifier: &Notifier, cart: &mut Cart) -> anyhow::Result<()> {
    if cart.is_empty() {
        println!("El carrito está vacío");
        return Ok(());
    }

    let receipt = Receipt::new(cart, Utc::now());
    println!("\n{}", receipt.render());

    if prompt("\n¿Confirmar compra? (S/N): ")?.to_lowercase() != "s" {
        return Ok(());
    }

    let email = prompt("Ingrese su correo electrónico: ")?;
    match notifier.send(&email, "Tu ticket de compra - Planet Cinema", &receipt.render()) {
        Ok(()) => {
            println!("\n¡Ticket enviado a tu correo electrónico!");
            cart.clear();
        }
        Err(e @ DeliveryError::InvalidAddress(_)) => println!("{}", e),
        Err(e) => {
            // El carrito se conserva para poder reintentar.
            println!("Error al enviar el correo: {}", e);
        }
    }

    Ok(())
}

fn prompt(text: &str) -> anyhow::Result<String> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
