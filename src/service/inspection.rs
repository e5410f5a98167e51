//! Inspection: re-derive a cargo's delivery after it was handled and tell
//! interested parties what changed.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Cargo, Delivery, HandlingEvent, TrackingId, UnLocode};
use crate::repository::{CargoEventHandler, CargoRepository, HandlingEventRepository};

use super::CargoLocks;

pub struct InspectionService {
    cargos: Arc<dyn CargoRepository>,
    events: Arc<dyn HandlingEventRepository>,
    handler: Arc<dyn CargoEventHandler>,
    locks: Arc<CargoLocks>,
}

impl InspectionService {
    pub fn new(
        cargos: Arc<dyn CargoRepository>,
        events: Arc<dyn HandlingEventRepository>,
        handler: Arc<dyn CargoEventHandler>,
        locks: Arc<CargoLocks>,
    ) -> Self {
        Self {
            cargos,
            events,
            handler,
            locks,
        }
    }

    /// Re-derives and stores the cargo's delivery from its full history.
    ///
    /// Flags are compared against the delivery the cargo had before, so
    /// inspecting an unchanged cargo notifies nobody.
    pub fn inspect_cargo(&self, tracking_id: &TrackingId) -> Result<()> {
        self.inspect(tracking_id, None)
    }

    /// Appends `event` to the cargo's history and inspects the cargo, all
    /// under the cargo's lock.
    pub fn record_and_inspect(&self, event: &HandlingEvent) -> Result<()> {
        self.inspect(&event.tracking_id, Some(event))
    }

    fn inspect(&self, tracking_id: &TrackingId, event: Option<&HandlingEvent>) -> Result<()> {
        let inspected = self.locks.with(tracking_id, || -> Result<(Cargo, Delivery)> {
            let mut cargo = self.cargos.find(tracking_id)?;
            let before = cargo.delivery.clone();

            if let Some(event) = event {
                self.events.append(event)?;
            }
            let history = self.events.query_history(tracking_id)?;
            cargo.derive_delivery_progress(&history);
            self.cargos.store(&cargo)?;
            Ok((cargo, before))
        });
        let (cargo, before) = inspected?;

        let delivery = &cargo.delivery;
        tracing::debug!(
            %tracking_id,
            transport_status = ?delivery.transport_status,
            routing_status = ?delivery.routing_status,
            misdirected = delivery.is_misdirected,
            "derived delivery"
        );

        if delivery.is_misdirected && !before.is_misdirected {
            self.handler.cargo_was_misdirected(&cargo);
        }
        if delivery.is_unloaded_at_destination && !before.is_unloaded_at_destination {
            self.handler.cargo_has_arrived(&cargo);
        }
        Ok(())
    }
}

/// Reports notifications as tracing events.
#[derive(Debug, Default)]
pub struct LoggingEventHandler;

impl CargoEventHandler for LoggingEventHandler {
    fn cargo_was_misdirected(&self, cargo: &Cargo) {
        tracing::warn!(
            tracking_id = %cargo.tracking_id,
            location = cargo.delivery.last_known_location.as_ref().map(UnLocode::as_str),
            "cargo was misdirected"
        );
    }

    fn cargo_has_arrived(&self, cargo: &Cargo) {
        tracing::info!(
            tracking_id = %cargo.tracking_id,
            destination = %cargo.route_specification.destination,
            "cargo has arrived"
        );
    }
}
