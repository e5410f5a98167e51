//! Use cases built on the model and the collaborator traits.
//!
//! ```text
//! booking     # Book cargos, assign itineraries, change destinations
//! handling    # Validate and register handling events
//! inspection  # Re-derive delivery after handling, notify on change
//! tracking    # Read model for end-user tracking views
//! locks       # One critical section per tracking id
//! ```
//!
//! Every read→derive→store sequence on a cargo runs inside that cargo's
//! lock from [`CargoLocks`], so concurrent handling and rerouting of the
//! same cargo cannot lose updates.

mod booking;
mod handling;
mod inspection;
mod locks;
mod tracking;

pub use booking::{BookedCargo, BookingService};
pub use handling::{HandlingEventFactory, HandlingService};
pub use inspection::{InspectionService, LoggingEventHandler};
pub use locks::CargoLocks;
pub use tracking::{TrackedCargo, TrackedEvent, TrackingService};
