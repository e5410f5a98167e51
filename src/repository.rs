//! Collaborator interfaces the use cases are written against.
//!
//! The core never reaches for globals: cargo and handling storage, reference
//! data, routing and notifications are all injected through these traits.
//! [`crate::inmem`] and [`crate::storage`] provide implementations.

use crate::error::Result;
use crate::model::{
    Cargo, HandlingEvent, HandlingHistory, Itinerary, Location, RouteSpecification, TrackingId,
    UnLocode, Voyage, VoyageNumber,
};

/// Cargo lookup and storage.
pub trait CargoRepository: Send + Sync {
    /// Returns [`crate::Error::UnknownCargo`] when no cargo has this id.
    fn find(&self, tracking_id: &TrackingId) -> Result<Cargo>;

    /// Inserts or replaces the cargo.
    fn store(&self, cargo: &Cargo) -> Result<()>;

    fn find_all(&self) -> Result<Vec<Cargo>>;

    /// Every booked tracking id, sorted. Cheaper than [`Self::find_all`]
    /// when the deliveries are not needed.
    fn tracking_ids(&self) -> Result<Vec<TrackingId>>;
}

/// Append-only handling event log.
pub trait HandlingEventRepository: Send + Sync {
    fn append(&self, event: &HandlingEvent) -> Result<()>;

    /// All events for the cargo in registration order. Empty for a cargo
    /// that has never been handled.
    fn query_history(&self, tracking_id: &TrackingId) -> Result<HandlingHistory>;
}

/// Read-only port reference data.
pub trait LocationRepository: Send + Sync {
    /// Returns [`crate::Error::UnknownLocation`] for an unknown code.
    fn find(&self, code: &UnLocode) -> Result<Location>;

    fn find_all(&self) -> Result<Vec<Location>>;
}

/// Read-only voyage reference data.
pub trait VoyageRepository: Send + Sync {
    /// Returns [`crate::Error::UnknownVoyage`] for an unknown number.
    fn find(&self, number: &VoyageNumber) -> Result<Voyage>;
}

/// Route finding: candidate itineraries for a route specification.
pub trait RoutingService: Send + Sync {
    fn fetch_routes_for_specification(&self, spec: &RouteSpecification) -> Vec<Itinerary>;
}

/// Notification sink for noteworthy delivery changes.
pub trait CargoEventHandler: Send + Sync {
    fn cargo_was_misdirected(&self, cargo: &Cargo);

    fn cargo_has_arrived(&self, cargo: &Cargo);
}
