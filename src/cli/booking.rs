//! Booking commands: book, list, locations, route, reroute.

use jiff::Timestamp;

use crate::model::{Itinerary, Leg, TrackingId, UnLocode};

use super::App;
use super::format::{format_booked, format_leg};

pub(super) fn cmd_book(
    app: &App,
    origin: &str,
    destination: &str,
    deadline: Timestamp,
) -> Result<(), String> {
    let id = app
        .booking
        .book_new_cargo(
            &UnLocode::from(origin.trim().to_ascii_uppercase().as_str()),
            &UnLocode::from(destination.trim().to_ascii_uppercase().as_str()),
            Some(deadline),
        )
        .map_err(|e| format!("failed to book cargo: {e}"))?;

    println!("{id}");
    Ok(())
}

pub(super) fn cmd_list(app: &App) -> Result<(), String> {
    let cargos = app
        .booking
        .cargos()
        .map_err(|e| format!("failed to list cargos: {e}"))?;

    if cargos.is_empty() {
        println!("No cargos");
        return Ok(());
    }

    for cargo in &cargos {
        println!("{}", format_booked(cargo));
    }
    Ok(())
}

pub(super) fn cmd_locations(app: &App) -> Result<(), String> {
    let locations = app
        .booking
        .locations()
        .map_err(|e| format!("failed to list locations: {e}"))?;

    for location in &locations {
        println!("{}  {}", location.un_locode, location.name);
    }
    Ok(())
}

pub(super) fn cmd_route(app: &App, id: &TrackingId, legs: Vec<Leg>) -> Result<(), String> {
    app.booking
        .assign_cargo_to_route(id, Itinerary::new(legs))
        .map_err(|e| format!("failed to route cargo: {e}"))?;

    let cargo = app
        .booking
        .load_cargo(id)
        .map_err(|e| format!("failed to load cargo: {e}"))?;

    eprintln!("Cargo {id} routed via {} leg(s)", cargo.legs.len());
    for leg in &cargo.legs {
        eprintln!("  {}", format_leg(leg));
    }
    if cargo.misrouted {
        eprintln!(
            "Warning: itinerary does not take the cargo from {} to {} in time",
            cargo.origin, cargo.destination
        );
    }
    Ok(())
}

pub(super) fn cmd_reroute(app: &App, id: &TrackingId, destination: &str) -> Result<(), String> {
    let destination = UnLocode::from(destination.trim().to_ascii_uppercase().as_str());
    app.booking
        .change_destination(id, &destination)
        .map_err(|e| format!("failed to change destination: {e}"))?;

    let cargo = app
        .booking
        .load_cargo(id)
        .map_err(|e| format!("failed to load cargo: {e}"))?;

    eprintln!("Cargo {id} now bound for {destination}");
    if cargo.misrouted {
        eprintln!("The current itinerary no longer fits; assign a new one with `freight route`");
    }
    Ok(())
}
