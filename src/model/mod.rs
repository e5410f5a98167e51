//! Core data model for freight.
//!
//! Reference data (locations, voyages), the plan for a cargo (itinerary,
//! route specification), what actually happened to it (handling events),
//! and the delivery snapshot derived from the two.

mod cargo;
mod delivery;
mod handling;
mod itinerary;
mod location;
mod voyage;

pub use cargo::{Cargo, TrackingId};
pub use delivery::{Delivery, RoutingStatus, TransportStatus};
pub use handling::{HandlingActivity, HandlingEvent, HandlingEventType, HandlingHistory};
pub use itinerary::{Itinerary, Leg, RouteSpecification};
pub use location::{Location, UnLocode, sample_locations};
pub use voyage::{CarrierMovement, Schedule, Voyage, VoyageNumber, sample_voyages};
