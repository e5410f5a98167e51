//! Handling: turning reports from the field into recorded events.

use std::sync::Arc;

use jiff::Timestamp;

use crate::error::{Error, Result};
use crate::model::{
    HandlingActivity, HandlingEvent, HandlingEventType, TrackingId, UnLocode, VoyageNumber,
};
use crate::repository::{CargoRepository, LocationRepository, VoyageRepository};

use super::InspectionService;

/// Builds handling events from raw identifiers, checking that each one
/// refers to something that exists.
///
/// Nothing ties the event to the cargo's itinerary here. An event that
/// makes no sense for the plan is still created; derivation flags the cargo
/// as misdirected afterwards.
pub struct HandlingEventFactory {
    cargos: Arc<dyn CargoRepository>,
    voyages: Arc<dyn VoyageRepository>,
    locations: Arc<dyn LocationRepository>,
}

impl HandlingEventFactory {
    pub fn new(
        cargos: Arc<dyn CargoRepository>,
        voyages: Arc<dyn VoyageRepository>,
        locations: Arc<dyn LocationRepository>,
    ) -> Self {
        Self {
            cargos,
            voyages,
            locations,
        }
    }

    /// Checks the cargo, then the voyage (when given), then the location.
    /// An empty voyage number means the event has no voyage.
    pub fn create_handling_event(
        &self,
        registered_at: Timestamp,
        completed_at: Timestamp,
        tracking_id: &TrackingId,
        voyage_number: &VoyageNumber,
        location: &UnLocode,
        kind: HandlingEventType,
    ) -> Result<HandlingEvent> {
        let cargo = self.cargos.find(tracking_id)?;

        let voyage = if voyage_number.is_empty() {
            None
        } else {
            Some(self.voyages.find(voyage_number)?.number)
        };

        let location = self.locations.find(location)?.un_locode;

        Ok(HandlingEvent {
            tracking_id: cargo.tracking_id,
            activity: HandlingActivity {
                kind,
                location,
                voyage_number: voyage,
            },
            registered_at,
            completed_at,
        })
    }
}

/// Registers handling events and has the cargo inspected afterwards.
pub struct HandlingService {
    factory: HandlingEventFactory,
    inspection: Arc<InspectionService>,
}

impl HandlingService {
    pub fn new(factory: HandlingEventFactory, inspection: Arc<InspectionService>) -> Self {
        Self {
            factory,
            inspection,
        }
    }

    /// Records that `kind` happened to the cargo at `completed_at`.
    ///
    /// The registration time is now. Missing arguments are rejected before
    /// any lookup.
    pub fn register_handling_event(
        &self,
        completed_at: Option<Timestamp>,
        tracking_id: &TrackingId,
        voyage_number: &VoyageNumber,
        location: &UnLocode,
        kind: HandlingEventType,
    ) -> Result<()> {
        let Some(completed_at) = completed_at else {
            return Err(reject(tracking_id, "completion time is required"));
        };
        if tracking_id.is_empty() || location.is_empty() {
            return Err(reject(tracking_id, "tracking id and location are required"));
        }
        if kind == HandlingEventType::NotHandled {
            return Err(reject(tracking_id, "event type is required"));
        }

        let event = self
            .factory
            .create_handling_event(
                Timestamp::now(),
                completed_at,
                tracking_id,
                voyage_number,
                location,
                kind,
            )
            .inspect_err(|e| tracing::warn!(%tracking_id, error = %e, "rejected handling event"))?;

        self.inspection.record_and_inspect(&event)?;
        tracing::info!(
            %tracking_id,
            event = %event.activity.kind,
            location = %event.activity.location,
            voyage = event.activity.voyage_number.as_ref().map(VoyageNumber::as_str),
            completed_at = %event.completed_at,
            "registered handling event"
        );
        Ok(())
    }
}

fn reject(tracking_id: &TrackingId, reason: &str) -> Error {
    tracing::warn!(%tracking_id, reason, "rejected handling event");
    Error::invalid(reason)
}
