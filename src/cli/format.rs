//! Argument parsing and output formatting for CLI display.

use jiff::Timestamp;

use crate::model::Leg;
use crate::service::{BookedCargo, TrackedCargo};

/// Parse `<voyage>,<from>,<to>,<load-time>,<unload-time>` into a leg.
pub(super) fn parse_leg(value: &str) -> Result<Leg, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [voyage, from, to, load, unload] = parts.as_slice() else {
        return Err(format!(
            "expected <voyage>,<from>,<to>,<load-time>,<unload-time>, got '{value}'"
        ));
    };
    if [voyage, from, to].iter().any(|p| p.is_empty()) {
        return Err(format!("empty voyage or location in '{value}'"));
    }

    let load_time: Timestamp = load
        .parse()
        .map_err(|e| format!("invalid load time '{load}': {e}"))?;
    let unload_time: Timestamp = unload
        .parse()
        .map_err(|e| format!("invalid unload time '{unload}': {e}"))?;
    if unload_time < load_time {
        return Err(format!("leg unloads before it loads: '{value}'"));
    }

    Ok(Leg {
        voyage_number: (*voyage).into(),
        load_location: (*from).into(),
        unload_location: (*to).into(),
        load_time,
        unload_time,
    })
}

/// One line per cargo: id, route, routing state.
pub(super) fn format_booked(cargo: &BookedCargo) -> String {
    let state = if !cargo.routed {
        "not routed"
    } else if cargo.misrouted {
        "misrouted"
    } else {
        "routed"
    };
    format!(
        "{}  {} → {}  [{state}]",
        cargo.tracking_id, cargo.origin, cargo.destination
    )
}

pub(super) fn format_leg(leg: &Leg) -> String {
    format!(
        "{}  {} {} → {} {}",
        leg.voyage_number, leg.load_location, leg.load_time, leg.unload_location, leg.unload_time
    )
}

/// Multi-line tracking summary.
pub(super) fn format_tracked(cargo: &TrackedCargo) -> String {
    let mut lines = vec![
        format!("Cargo {}: {} → {}", cargo.tracking_id, cargo.origin, cargo.destination),
        format!("Status: {}", cargo.status_text),
    ];
    if cargo.misdirected {
        lines.push("Misdirected: the itinerary no longer describes this cargo".to_string());
    }
    if let Some(eta) = cargo.eta {
        lines.push(format!("ETA: {eta}"));
    }
    if let Some(deadline) = cargo.arrival_deadline {
        lines.push(format!("Deadline: {deadline}"));
    }
    lines.push(cargo.next_expected_activity.clone());

    if !cargo.events.is_empty() {
        lines.push(String::new());
        for event in &cargo.events {
            let marker = if event.expected { " " } else { "!" };
            lines.push(format!("{marker} {}", event.description));
        }
    }
    lines.join("\n")
}
