//! Handling and tracking commands: handle, track.

use jiff::Timestamp;

use crate::model::{HandlingEventType, TrackingId, UnLocode, VoyageNumber};

use super::App;
use super::format::format_tracked;

pub(super) fn cmd_handle(
    app: &App,
    id: &TrackingId,
    event: &str,
    location: &str,
    voyage: Option<&str>,
    completed: Timestamp,
) -> Result<(), String> {
    let kind = HandlingEventType::parse(event);
    if kind == HandlingEventType::NotHandled {
        return Err(format!(
            "unknown event type '{event}': expected receive, load, unload, customs or claim"
        ));
    }
    let voyage = voyage.map(str::trim).unwrap_or_default();
    if kind.requires_voyage() && voyage.is_empty() {
        return Err(format!("{kind} events require --voyage"));
    }

    let location = UnLocode::from(location.trim().to_ascii_uppercase().as_str());
    let voyage = VoyageNumber::from(voyage.to_ascii_uppercase().as_str());
    app.handling
        .register_handling_event(Some(completed), id, &voyage, &location, kind)
        .map_err(|e| format!("failed to register handling event: {e}"))?;

    let tracked = app
        .tracking
        .track(id)
        .map_err(|e| format!("failed to track cargo: {e}"))?;
    eprintln!("Registered {kind} of {id} in {location}");
    eprintln!("Status: {}", tracked.status_text);
    if tracked.misdirected {
        eprintln!("Warning: cargo is misdirected");
    }
    Ok(())
}

pub(super) fn cmd_track(app: &App, id: &TrackingId, json: bool) -> Result<(), String> {
    let tracked = app
        .tracking
        .track(id)
        .map_err(|e| format!("failed to track cargo: {e}"))?;

    if json {
        let json = serde_json::to_string_pretty(&tracked)
            .map_err(|e| format!("failed to serialize tracking: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", format_tracked(&tracked));
    }
    Ok(())
}
