//! Cargo: the aggregate root binding a route specification, an itinerary
//! and the delivery derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    delivery::Delivery,
    handling::HandlingHistory,
    itinerary::{Itinerary, RouteSpecification},
    location::UnLocode,
};

/// Globally unique cargo identifier, assigned at booking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh id: the first group of a random UUID, upper-cased.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().to_string().to_ascii_uppercase();
        let head = uuid.split('-').next().unwrap_or(&uuid);
        Self(head.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackingId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A booked cargo.
///
/// `delivery` is a cached projection of (route specification, itinerary,
/// handling history). It is refreshed by every mutating method here and by
/// [`Cargo::derive_delivery_progress`]; it is never the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cargo {
    pub tracking_id: TrackingId,
    /// Where the cargo was booked from. Survives rerouting.
    pub origin: UnLocode,
    pub route_specification: RouteSpecification,
    pub itinerary: Itinerary,
    pub delivery: Delivery,
}

impl Cargo {
    /// Books a new, unrouted cargo.
    pub fn new(tracking_id: TrackingId, route_specification: RouteSpecification) -> Self {
        let itinerary = Itinerary::default();
        let delivery = Delivery::derive(
            &route_specification,
            &itinerary,
            &HandlingHistory::default(),
        );
        Self {
            tracking_id,
            origin: route_specification.origin.clone(),
            route_specification,
            itinerary,
            delivery,
        }
    }

    /// Commits the cargo to a new itinerary.
    ///
    /// The itinerary is not checked against the route specification; callers
    /// pass itineraries obtained from the routing collaborator. One that does
    /// not satisfy the specification shows up as misrouted.
    pub fn assign_to_route(&mut self, itinerary: Itinerary) {
        self.itinerary = itinerary;
        self.delivery = self
            .delivery
            .update_on_routing(&self.route_specification, &self.itinerary);
    }

    /// Replaces the route specification.
    ///
    /// The current itinerary is kept, so the cargo reads as misrouted until a
    /// new itinerary satisfying the specification is assigned.
    pub fn specify_new_route(&mut self, route_specification: RouteSpecification) {
        self.route_specification = route_specification;
        self.delivery = self
            .delivery
            .update_on_routing(&self.route_specification, &self.itinerary);
    }

    /// Re-derives the delivery snapshot from the full handling history.
    pub fn derive_delivery_progress(&mut self, history: &HandlingHistory) {
        self.delivery = Delivery::derive(&self.route_specification, &self.itinerary, history);
    }
}
