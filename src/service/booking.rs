//! Booking: the administrator-facing use cases.

use std::sync::Arc;

use jiff::Timestamp;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    Cargo, Itinerary, Leg, Location, RouteSpecification, RoutingStatus, TrackingId, UnLocode,
};
use crate::repository::{CargoRepository, LocationRepository, RoutingService};

use super::CargoLocks;

/// Read model of a booked cargo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookedCargo {
    pub tracking_id: TrackingId,
    pub origin: UnLocode,
    pub destination: UnLocode,
    pub arrival_deadline: Option<Timestamp>,
    pub legs: Vec<Leg>,
    /// Has an itinerary at all.
    pub routed: bool,
    /// Has an itinerary that does not satisfy the route specification.
    pub misrouted: bool,
}

impl From<&Cargo> for BookedCargo {
    fn from(cargo: &Cargo) -> Self {
        Self {
            tracking_id: cargo.tracking_id.clone(),
            origin: cargo.origin.clone(),
            destination: cargo.route_specification.destination.clone(),
            arrival_deadline: cargo.route_specification.arrival_deadline,
            legs: cargo.itinerary.legs.clone(),
            routed: !cargo.itinerary.is_empty(),
            misrouted: cargo.delivery.routing_status == RoutingStatus::Misrouted,
        }
    }
}

pub struct BookingService {
    cargos: Arc<dyn CargoRepository>,
    locations: Arc<dyn LocationRepository>,
    locks: Arc<CargoLocks>,
}

impl BookingService {
    pub fn new(
        cargos: Arc<dyn CargoRepository>,
        locations: Arc<dyn LocationRepository>,
        locks: Arc<CargoLocks>,
    ) -> Self {
        Self {
            cargos,
            locations,
            locks,
        }
    }

    /// Books a new, unrouted cargo and returns its tracking id.
    pub fn book_new_cargo(
        &self,
        origin: &UnLocode,
        destination: &UnLocode,
        arrival_deadline: Option<Timestamp>,
    ) -> Result<TrackingId> {
        if origin.is_empty() || destination.is_empty() {
            return Err(Error::invalid("origin and destination are required"));
        }
        let Some(arrival_deadline) = arrival_deadline else {
            return Err(Error::invalid("arrival deadline is required"));
        };
        self.locations.find(origin)?;
        self.locations.find(destination)?;

        let cargo = Cargo::new(
            TrackingId::generate(),
            RouteSpecification {
                origin: origin.clone(),
                destination: destination.clone(),
                arrival_deadline: Some(arrival_deadline),
            },
        );
        self.cargos.store(&cargo)?;

        tracing::info!(
            tracking_id = %cargo.tracking_id,
            %origin,
            %destination,
            "booked cargo"
        );
        Ok(cargo.tracking_id)
    }

    pub fn load_cargo(&self, tracking_id: &TrackingId) -> Result<BookedCargo> {
        if tracking_id.is_empty() {
            return Err(Error::invalid("tracking id is required"));
        }
        let cargo = self.cargos.find(tracking_id)?;
        Ok(BookedCargo::from(&cargo))
    }

    /// Candidate itineraries for the cargo's current route specification.
    /// Empty for an unknown cargo.
    pub fn request_possible_routes(
        &self,
        tracking_id: &TrackingId,
        router: &dyn RoutingService,
    ) -> Result<Vec<Itinerary>> {
        match self.cargos.find(tracking_id) {
            Ok(cargo) => Ok(router.fetch_routes_for_specification(&cargo.route_specification)),
            Err(Error::UnknownCargo(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Commits the cargo to `itinerary`.
    ///
    /// The itinerary is accepted even if it does not satisfy the route
    /// specification; the cargo then reads as misrouted.
    pub fn assign_cargo_to_route(&self, tracking_id: &TrackingId, itinerary: Itinerary) -> Result<()> {
        if tracking_id.is_empty() || itinerary.is_empty() {
            return Err(Error::invalid("tracking id and a non-empty itinerary are required"));
        }

        self.locks.with(tracking_id, || -> Result<()> {
            let mut cargo = self.cargos.find(tracking_id)?;
            cargo.assign_to_route(itinerary);
            self.cargos.store(&cargo)?;

            tracing::info!(
                %tracking_id,
                legs = cargo.itinerary.legs.len(),
                "assigned cargo to route"
            );
            if cargo.delivery.routing_status == RoutingStatus::Misrouted {
                tracing::warn!(%tracking_id, "assigned itinerary does not satisfy route specification");
            }
            Ok(())
        })
    }

    /// Points the cargo at a new destination, keeping its origin and deadline.
    ///
    /// The current itinerary is left in place until a new one is assigned.
    pub fn change_destination(&self, tracking_id: &TrackingId, destination: &UnLocode) -> Result<()> {
        if tracking_id.is_empty() || destination.is_empty() {
            return Err(Error::invalid("tracking id and destination are required"));
        }

        self.locks.with(tracking_id, || -> Result<()> {
            let mut cargo = self.cargos.find(tracking_id)?;
            let location = self.locations.find(destination)?;

            cargo.specify_new_route(RouteSpecification {
                origin: cargo.origin.clone(),
                destination: location.un_locode,
                arrival_deadline: cargo.route_specification.arrival_deadline,
            });
            self.cargos.store(&cargo)?;

            tracing::info!(
                %tracking_id,
                %destination,
                routing_status = ?cargo.delivery.routing_status,
                "changed destination"
            );
            Ok(())
        })
    }

    /// Every booked cargo, ordered by tracking id.
    pub fn cargos(&self) -> Result<Vec<BookedCargo>> {
        Ok(self
            .cargos
            .find_all()?
            .iter()
            .map(BookedCargo::from)
            .collect())
    }

    /// Every known location, ordered by code.
    pub fn locations(&self) -> Result<Vec<Location>> {
        self.locations.find_all()
    }
}
