//! Delivery: the derived snapshot of where a cargo is and what should happen
//! to it next.
//!
//! A [`Delivery`] is a pure function of the route specification, the current
//! itinerary and the handling history. It is never mutated in place; every
//! change to its inputs produces a fresh snapshot.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{
    handling::{HandlingActivity, HandlingEvent, HandlingEventType, HandlingHistory},
    itinerary::{Itinerary, RouteSpecification},
    location::UnLocode,
    voyage::VoyageNumber,
};

/// Where the cargo physically is, as far as handling events tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportStatus {
    NotReceived,
    InPort,
    OnboardCarrier,
    Claimed,
    Unknown,
}

/// How the current itinerary relates to the route specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingStatus {
    NotRouted,
    Routed,
    Misrouted,
}

/// Snapshot of a cargo's delivery progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// The most recently completed event this snapshot was derived from.
    pub last_event: Option<HandlingEvent>,
    pub last_known_location: Option<UnLocode>,
    /// Only set while the cargo is onboard a carrier.
    pub current_voyage: Option<VoyageNumber>,
    pub transport_status: TransportStatus,
    /// Unknown once the cargo is off track.
    pub eta: Option<Timestamp>,
    /// `None` when nothing is expected, or the plan no longer applies.
    pub next_expected_activity: Option<HandlingActivity>,
    pub is_misdirected: bool,
    pub is_unloaded_at_destination: bool,
    pub routing_status: RoutingStatus,
    pub calculated_at: Timestamp,
}

impl Delivery {
    /// Derives a snapshot from the cargo's inputs, stamped with the current time.
    pub fn derive(
        spec: &RouteSpecification,
        itinerary: &Itinerary,
        history: &HandlingHistory,
    ) -> Self {
        Self::derive_at(spec, itinerary, history, Timestamp::now())
    }

    /// Derives a snapshot stamped with `calculated_at`.
    pub fn derive_at(
        spec: &RouteSpecification,
        itinerary: &Itinerary,
        history: &HandlingHistory,
        calculated_at: Timestamp,
    ) -> Self {
        let last_event = history.most_recently_completed_event().cloned();
        Self::from_last_event(spec, itinerary, last_event, calculated_at)
    }

    /// Re-derives after the route specification or itinerary changed,
    /// keeping the last event this snapshot already knows about.
    pub fn update_on_routing(&self, spec: &RouteSpecification, itinerary: &Itinerary) -> Self {
        Self::from_last_event(spec, itinerary, self.last_event.clone(), Timestamp::now())
    }

    /// Routed and not misdirected: the itinerary still describes reality.
    pub fn is_on_track(&self) -> bool {
        self.routing_status == RoutingStatus::Routed && !self.is_misdirected
    }

    fn from_last_event(
        spec: &RouteSpecification,
        itinerary: &Itinerary,
        last_event: Option<HandlingEvent>,
        calculated_at: Timestamp,
    ) -> Self {
        let last = last_event.as_ref();
        let mut delivery = Self {
            last_known_location: last.map(|e| e.activity.location.clone()),
            current_voyage: last.and_then(current_voyage),
            transport_status: transport_status(last),
            eta: None,
            next_expected_activity: None,
            is_misdirected: last.is_some_and(|e| !itinerary.is_expected(e)),
            is_unloaded_at_destination: last.is_some_and(|e| {
                e.activity.kind == HandlingEventType::Unload
                    && e.activity.location == spec.destination
            }),
            routing_status: routing_status(itinerary, spec),
            calculated_at,
            last_event: None,
        };

        if delivery.is_on_track() {
            delivery.eta = itinerary.final_arrival_time();
            delivery.next_expected_activity = next_expected_activity(last, spec, itinerary);
        }
        delivery.last_event = last_event;
        delivery
    }
}

fn routing_status(itinerary: &Itinerary, spec: &RouteSpecification) -> RoutingStatus {
    if itinerary.is_empty() {
        RoutingStatus::NotRouted
    } else if itinerary.satisfies(spec) {
        RoutingStatus::Routed
    } else {
        RoutingStatus::Misrouted
    }
}

fn transport_status(last: Option<&HandlingEvent>) -> TransportStatus {
    let Some(event) = last else {
        return TransportStatus::NotReceived;
    };
    match event.activity.kind {
        HandlingEventType::Receive | HandlingEventType::Unload | HandlingEventType::Customs => {
            TransportStatus::InPort
        }
        HandlingEventType::Load => TransportStatus::OnboardCarrier,
        HandlingEventType::Claim => TransportStatus::Claimed,
        HandlingEventType::NotHandled => TransportStatus::Unknown,
    }
}

fn current_voyage(event: &HandlingEvent) -> Option<VoyageNumber> {
    match event.activity.kind {
        HandlingEventType::Load => event.activity.voyage_number.clone(),
        _ => None,
    }
}

/// Walks the itinerary from the last event to the step that should follow it.
/// Only meaningful while the cargo is on track.
fn next_expected_activity(
    last: Option<&HandlingEvent>,
    spec: &RouteSpecification,
    itinerary: &Itinerary,
) -> Option<HandlingActivity> {
    let Some(event) = last else {
        return Some(HandlingActivity::at(
            HandlingEventType::Receive,
            spec.origin.clone(),
        ));
    };

    let activity = &event.activity;
    match activity.kind {
        HandlingEventType::Receive => itinerary.legs.first().map(|leg| {
            HandlingActivity::on_voyage(
                HandlingEventType::Load,
                leg.load_location.clone(),
                leg.voyage_number.clone(),
            )
        }),
        HandlingEventType::Load => {
            let voyage = activity.voyage_number.as_ref()?;
            let (_, leg) = itinerary.leg_matching_load(voyage, &activity.location)?;
            Some(HandlingActivity::on_voyage(
                HandlingEventType::Unload,
                leg.unload_location.clone(),
                leg.voyage_number.clone(),
            ))
        }
        HandlingEventType::Unload => {
            let voyage = activity.voyage_number.as_ref()?;
            let (i, leg) = itinerary.leg_matching_unload(voyage, &activity.location)?;
            match itinerary.legs.get(i + 1) {
                Some(next) => Some(HandlingActivity::on_voyage(
                    HandlingEventType::Load,
                    next.load_location.clone(),
                    next.voyage_number.clone(),
                )),
                None => Some(HandlingActivity::at(
                    HandlingEventType::Claim,
                    leg.unload_location.clone(),
                )),
            }
        }
        HandlingEventType::Customs | HandlingEventType::Claim | HandlingEventType::NotHandled => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Leg, TrackingId};

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn spec() -> RouteSpecification {
        RouteSpecification {
            origin: "CNHKG".into(),
            destination: "SESTO".into(),
            arrival_deadline: Some(at("2009-03-18T00:00:00Z")),
        }
    }

    fn leg(voyage: &str, from: &str, to: &str, load: &str, unload: &str) -> Leg {
        Leg {
            voyage_number: voyage.into(),
            load_location: from.into(),
            unload_location: to.into(),
            load_time: at(load),
            unload_time: at(unload),
        }
    }

    fn itinerary() -> Itinerary {
        Itinerary::new(vec![
            leg("V100", "CNHKG", "USNYC", "2009-03-03T00:00:00Z", "2009-03-09T00:00:00Z"),
            leg("V200", "USNYC", "USCHI", "2009-03-10T00:00:00Z", "2009-03-12T00:00:00Z"),
            leg("V300", "USCHI", "SESTO", "2009-03-13T00:00:00Z", "2009-03-16T00:00:00Z"),
        ])
    }

    fn event(
        kind: HandlingEventType,
        location: &str,
        voyage: Option<&str>,
        completed: &str,
    ) -> HandlingEvent {
        HandlingEvent {
            tracking_id: TrackingId::new("ABC123"),
            activity: HandlingActivity {
                kind,
                location: location.into(),
                voyage_number: voyage.map(VoyageNumber::from),
            },
            registered_at: at("2009-03-20T00:00:00Z"),
            completed_at: at(completed),
        }
    }

    fn receive() -> HandlingEvent {
        event(HandlingEventType::Receive, "CNHKG", None, "2009-03-01T00:00:00Z")
    }

    fn load_v100() -> HandlingEvent {
        event(HandlingEventType::Load, "CNHKG", Some("V100"), "2009-03-03T00:00:00Z")
    }

    fn derive(itinerary: &Itinerary, events: Vec<HandlingEvent>) -> Delivery {
        Delivery::derive_at(
            &spec(),
            itinerary,
            &HandlingHistory::new(events),
            at("2009-03-20T12:00:00Z"),
        )
    }

    #[test]
    fn unrouted_and_unhandled() {
        let d = derive(&Itinerary::default(), vec![]);

        assert_eq!(d.transport_status, TransportStatus::NotReceived);
        assert_eq!(d.routing_status, RoutingStatus::NotRouted);
        assert_eq!(d.eta, None);
        assert_eq!(d.next_expected_activity, None);
        assert_eq!(d.last_known_location, None);
        assert!(!d.is_misdirected);
        assert!(!d.is_unloaded_at_destination);
    }

    #[test]
    fn routed_but_unhandled_expects_receive_at_origin() {
        let d = derive(&itinerary(), vec![]);

        assert_eq!(d.routing_status, RoutingStatus::Routed);
        assert_eq!(d.transport_status, TransportStatus::NotReceived);
        assert_eq!(d.eta, Some(at("2009-03-16T00:00:00Z")));
        assert_eq!(
            d.next_expected_activity,
            Some(HandlingActivity::at(HandlingEventType::Receive, "CNHKG".into()))
        );
    }

    #[test]
    fn received_then_loaded() {
        let d = derive(&itinerary(), vec![receive()]);
        assert_eq!(d.transport_status, TransportStatus::InPort);
        assert_eq!(d.last_known_location, Some("CNHKG".into()));
        assert!(!d.is_misdirected);
        assert!(d.is_on_track());
        assert_eq!(
            d.next_expected_activity,
            Some(HandlingActivity::on_voyage(
                HandlingEventType::Load,
                "CNHKG".into(),
                "V100".into()
            ))
        );

        let d = derive(&itinerary(), vec![receive(), load_v100()]);
        assert_eq!(d.transport_status, TransportStatus::OnboardCarrier);
        assert_eq!(d.current_voyage, Some("V100".into()));
        assert_eq!(
            d.next_expected_activity,
            Some(HandlingActivity::on_voyage(
                HandlingEventType::Unload,
                "USNYC".into(),
                "V100".into()
            ))
        );
    }

    #[test]
    fn unload_mid_route_expects_next_leg_load() {
        let unload = event(HandlingEventType::Unload, "USNYC", Some("V100"), "2009-03-09T00:00:00Z");
        let d = derive(&itinerary(), vec![receive(), load_v100(), unload]);

        assert_eq!(d.transport_status, TransportStatus::InPort);
        assert_eq!(d.current_voyage, None);
        assert!(!d.is_unloaded_at_destination);
        assert_eq!(
            d.next_expected_activity,
            Some(HandlingActivity::on_voyage(
                HandlingEventType::Load,
                "USNYC".into(),
                "V200".into()
            ))
        );
    }

    #[test]
    fn unload_at_destination_expects_claim() {
        let unload = event(HandlingEventType::Unload, "SESTO", Some("V300"), "2009-03-16T00:00:00Z");
        let d = derive(&itinerary(), vec![receive(), load_v100(), unload]);

        assert!(d.is_unloaded_at_destination);
        assert!(!d.is_misdirected);
        assert_eq!(
            d.next_expected_activity,
            Some(HandlingActivity::at(HandlingEventType::Claim, "SESTO".into()))
        );
    }

    #[test]
    fn claimed_expects_nothing() {
        let claim = event(HandlingEventType::Claim, "SESTO", None, "2009-03-17T00:00:00Z");
        let d = derive(&itinerary(), vec![receive(), claim]);

        assert_eq!(d.transport_status, TransportStatus::Claimed);
        assert_eq!(d.next_expected_activity, None);
        assert!(!d.is_misdirected);
    }

    #[test]
    fn misdirected_unload_still_updates_position() {
        let unload = event(HandlingEventType::Unload, "JNTKO", Some("V100"), "2009-03-05T00:00:00Z");
        let d = derive(&itinerary(), vec![receive(), load_v100(), unload]);

        assert_eq!(d.transport_status, TransportStatus::InPort);
        assert_eq!(d.last_known_location, Some("JNTKO".into()));
        assert_eq!(d.current_voyage, None);
        assert!(d.is_misdirected);
        assert_eq!(d.next_expected_activity, None);
        assert_eq!(d.eta, None);
        // Misdirection is about handling, not about the plan itself.
        assert_eq!(d.routing_status, RoutingStatus::Routed);
        assert!(!d.is_on_track());
    }

    #[test]
    fn customs_is_in_port_and_never_misdirected() {
        let customs = event(HandlingEventType::Customs, "AUMEL", None, "2009-03-04T00:00:00Z");
        let d = derive(&itinerary(), vec![receive(), customs]);

        assert_eq!(d.transport_status, TransportStatus::InPort);
        assert_eq!(d.last_known_location, Some("AUMEL".into()));
        assert!(!d.is_misdirected);
        assert_eq!(d.routing_status, RoutingStatus::Routed);
    }

    #[test]
    fn any_event_without_itinerary_is_misdirected() {
        let d = derive(&Itinerary::default(), vec![receive()]);

        assert!(d.is_misdirected);
        assert_eq!(d.transport_status, TransportStatus::InPort);
        assert_eq!(d.routing_status, RoutingStatus::NotRouted);
    }

    #[test]
    fn misrouted_when_itinerary_misses_deadline() {
        let late = Itinerary::new(vec![leg(
            "V100",
            "CNHKG",
            "SESTO",
            "2009-03-03T00:00:00Z",
            "2009-03-25T00:00:00Z",
        )]);
        let d = derive(&late, vec![]);

        assert_eq!(d.routing_status, RoutingStatus::Misrouted);
        assert_eq!(d.next_expected_activity, None);
        assert_eq!(d.eta, None);
    }

    #[test]
    fn derivation_is_pure() {
        let events = vec![receive(), load_v100()];
        let a = derive(&itinerary(), events.clone());
        let b = derive(&itinerary(), events);
        assert_eq!(a, b);
    }

    #[test]
    fn registration_order_does_not_matter_when_completion_order_is_fixed() {
        let in_order = derive(&itinerary(), vec![receive(), load_v100()]);
        let late_report = derive(&itinerary(), vec![load_v100(), receive()]);

        assert_eq!(in_order.transport_status, late_report.transport_status);
        assert_eq!(in_order.is_misdirected, late_report.is_misdirected);
        assert_eq!(in_order.last_event, late_report.last_event);
    }

    #[test]
    fn routing_status_ignores_history() {
        let unload = event(HandlingEventType::Unload, "JNTKO", Some("V100"), "2009-03-05T00:00:00Z");
        let handled = derive(&itinerary(), vec![receive(), load_v100(), unload]);
        let unhandled = derive(&itinerary(), vec![]);

        assert!(handled.is_misdirected);
        assert_eq!(handled.routing_status, unhandled.routing_status);
    }

    #[test]
    fn unloaded_at_destination_implies_unload_there() {
        let histories = vec![
            vec![receive()],
            vec![receive(), load_v100()],
            vec![event(HandlingEventType::Unload, "SESTO", Some("V300"), "2009-03-16T00:00:00Z")],
            vec![event(HandlingEventType::Claim, "SESTO", None, "2009-03-16T00:00:00Z")],
            vec![event(HandlingEventType::Customs, "SESTO", None, "2009-03-16T00:00:00Z")],
        ];

        for events in histories {
            let d = derive(&itinerary(), events);
            if d.is_unloaded_at_destination {
                let last = d.last_event.as_ref().unwrap();
                assert_eq!(last.activity.kind, HandlingEventType::Unload);
                assert_eq!(last.activity.location, spec().destination);
            }
        }
    }

    #[test]
    fn update_on_routing_reevaluates_last_event_against_new_plan() {
        let unload = event(HandlingEventType::Unload, "JNTKO", Some("V100"), "2009-03-05T00:00:00Z");
        let d = derive(&itinerary(), vec![receive(), load_v100(), unload]);
        assert!(d.is_misdirected);

        let via_tokyo = Itinerary::new(vec![
            leg("V100", "CNHKG", "JNTKO", "2009-03-03T00:00:00Z", "2009-03-05T00:00:00Z"),
            leg("V300", "JNTKO", "SESTO", "2009-03-08T00:00:00Z", "2009-03-17T00:00:00Z"),
        ]);
        let updated = d.update_on_routing(&spec(), &via_tokyo);

        assert!(!updated.is_misdirected);
        assert_eq!(updated.routing_status, RoutingStatus::Routed);
        assert_eq!(updated.last_event, d.last_event);
        assert_eq!(
            updated.next_expected_activity,
            Some(HandlingActivity::on_voyage(
                HandlingEventType::Load,
                "JNTKO".into(),
                "V300".into()
            ))
        );
    }
}
