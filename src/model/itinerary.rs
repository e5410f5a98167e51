//! Itineraries: the committed plan of legs for a cargo, and the route
//! specification any such plan must satisfy.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{
    handling::{HandlingEvent, HandlingEventType},
    location::UnLocode,
    voyage::VoyageNumber,
};

/// One voyage segment of an itinerary: load at one port, unload at another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub voyage_number: VoyageNumber,
    pub load_location: UnLocode,
    pub unload_location: UnLocode,
    pub load_time: Timestamp,
    pub unload_time: Timestamp,
}

/// An ordered sequence of legs. Empty means "not routed".
///
/// Legs are assumed connected (`legs[i].unload_location ==
/// legs[i + 1].load_location`); routing collaborators are trusted to
/// produce well-formed itineraries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
}

impl Itinerary {
    pub fn new(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Where the cargo is first loaded.
    pub fn initial_departure_location(&self) -> Option<&UnLocode> {
        self.legs.first().map(|leg| &leg.load_location)
    }

    /// Where the cargo is finally unloaded.
    pub fn final_arrival_location(&self) -> Option<&UnLocode> {
        self.legs.last().map(|leg| &leg.unload_location)
    }

    /// When the cargo is finally unloaded.
    pub fn final_arrival_time(&self) -> Option<Timestamp> {
        self.legs.last().map(|leg| leg.unload_time)
    }

    /// The first leg loading onto `voyage` at `location`, with its position.
    pub fn leg_matching_load(
        &self,
        voyage: &VoyageNumber,
        location: &UnLocode,
    ) -> Option<(usize, &Leg)> {
        self.legs
            .iter()
            .enumerate()
            .find(|(_, leg)| &leg.voyage_number == voyage && &leg.load_location == location)
    }

    /// The first leg unloading off `voyage` at `location`, with its position.
    pub fn leg_matching_unload(
        &self,
        voyage: &VoyageNumber,
        location: &UnLocode,
    ) -> Option<(usize, &Leg)> {
        self.legs
            .iter()
            .enumerate()
            .find(|(_, leg)| &leg.voyage_number == voyage && &leg.unload_location == location)
    }

    /// Whether the plan predicts this event.
    ///
    /// Nothing is expected of an empty itinerary. Customs can happen anywhere.
    pub fn is_expected(&self, event: &HandlingEvent) -> bool {
        if self.is_empty() {
            return false;
        }

        let activity = &event.activity;
        match activity.kind {
            HandlingEventType::Receive => {
                self.initial_departure_location() == Some(&activity.location)
            }
            HandlingEventType::Load => activity
                .voyage_number
                .as_ref()
                .is_some_and(|v| self.leg_matching_load(v, &activity.location).is_some()),
            HandlingEventType::Unload => activity
                .voyage_number
                .as_ref()
                .is_some_and(|v| self.leg_matching_unload(v, &activity.location).is_some()),
            HandlingEventType::Claim => self.final_arrival_location() == Some(&activity.location),
            HandlingEventType::Customs | HandlingEventType::NotHandled => true,
        }
    }

    /// Whether this itinerary gets the cargo from the specified origin to
    /// the specified destination in time.
    pub fn satisfies(&self, spec: &RouteSpecification) -> bool {
        let (Some(first), Some(last)) = (self.legs.first(), self.legs.last()) else {
            return false;
        };

        first.load_location == spec.origin
            && last.unload_location == spec.destination
            && spec
                .arrival_deadline
                .is_none_or(|deadline| last.unload_time <= deadline)
    }
}

/// What any itinerary for a cargo must achieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpecification {
    pub origin: UnLocode,
    pub destination: UnLocode,
    pub arrival_deadline: Option<Timestamp>,
}
