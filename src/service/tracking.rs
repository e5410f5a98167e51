//! Tracking: the read model shown to whoever is waiting for the cargo.

use std::sync::Arc;

use jiff::Timestamp;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    Cargo, HandlingActivity, HandlingEvent, HandlingEventType, TrackingId, TransportStatus,
};
use crate::repository::{CargoRepository, HandlingEventRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedCargo {
    pub tracking_id: TrackingId,
    pub status_text: String,
    pub origin: String,
    pub destination: String,
    pub eta: Option<Timestamp>,
    pub next_expected_activity: String,
    pub arrival_deadline: Option<Timestamp>,
    pub misdirected: bool,
    pub events: Vec<TrackedEvent>,
}

/// One handling event as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedEvent {
    pub description: String,
    /// Whether the current itinerary predicts this event.
    pub expected: bool,
}

pub struct TrackingService {
    cargos: Arc<dyn CargoRepository>,
    events: Arc<dyn HandlingEventRepository>,
}

impl TrackingService {
    pub fn new(
        cargos: Arc<dyn CargoRepository>,
        events: Arc<dyn HandlingEventRepository>,
    ) -> Self {
        Self { cargos, events }
    }

    pub fn track(&self, tracking_id: &TrackingId) -> Result<TrackedCargo> {
        if tracking_id.is_empty() {
            return Err(Error::invalid("tracking id is required"));
        }
        let cargo = self.cargos.find(tracking_id)?;
        let history = self.events.query_history(tracking_id)?;

        Ok(TrackedCargo {
            tracking_id: cargo.tracking_id.clone(),
            status_text: status_text(&cargo),
            origin: cargo.origin.to_string(),
            destination: cargo.route_specification.destination.to_string(),
            eta: cargo.delivery.eta,
            next_expected_activity: next_activity_text(
                cargo.delivery.next_expected_activity.as_ref(),
            ),
            arrival_deadline: cargo.route_specification.arrival_deadline,
            misdirected: cargo.delivery.is_misdirected,
            events: history
                .events()
                .iter()
                .map(|e| TrackedEvent {
                    description: describe_event(e),
                    expected: cargo.itinerary.is_expected(e),
                })
                .collect(),
        })
    }
}

fn status_text(cargo: &Cargo) -> String {
    let delivery = &cargo.delivery;
    match delivery.transport_status {
        TransportStatus::NotReceived => "Not received".to_string(),
        TransportStatus::InPort => match &delivery.last_known_location {
            Some(location) => format!("In port {location}"),
            None => "In port".to_string(),
        },
        TransportStatus::OnboardCarrier => match &delivery.current_voyage {
            Some(voyage) => format!("Onboard voyage {voyage}"),
            None => "Onboard".to_string(),
        },
        TransportStatus::Claimed => "Claimed".to_string(),
        TransportStatus::Unknown => "Unknown".to_string(),
    }
}

fn next_activity_text(activity: Option<&HandlingActivity>) -> String {
    let Some(activity) = activity else {
        return "There are currently no expected activities for this cargo.".to_string();
    };

    let location = &activity.location;
    let voyage = activity
        .voyage_number
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let prefix = "Next expected activity is to";
    match activity.kind {
        HandlingEventType::Load => {
            format!("{prefix} load cargo onto voyage {voyage} in {location}.")
        }
        HandlingEventType::Unload => {
            format!("{prefix} unload cargo off of voyage {voyage} in {location}.")
        }
        HandlingEventType::NotHandled => {
            "There are currently no expected activities for this cargo.".to_string()
        }
        kind => {
            let verb = kind.to_string().to_ascii_lowercase();
            format!("{prefix} {verb} cargo in {location}.")
        }
    }
}

fn describe_event(event: &HandlingEvent) -> String {
    let activity = &event.activity;
    let location = &activity.location;
    let at = event.completed_at;
    let voyage = activity
        .voyage_number
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    match activity.kind {
        HandlingEventType::NotHandled => "Cargo has not yet been received.".to_string(),
        HandlingEventType::Receive => format!("Received in {location}, at {at}."),
        HandlingEventType::Load => format!("Loaded onto voyage {voyage} in {location}, at {at}."),
        HandlingEventType::Unload => {
            format!("Unloaded off voyage {voyage} in {location}, at {at}.")
        }
        HandlingEventType::Claim => format!("Claimed in {location}, at {at}."),
        HandlingEventType::Customs => format!("Cleared customs in {location}, at {at}."),
    }
}
