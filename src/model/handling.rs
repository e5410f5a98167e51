//! Handling types: observed real-world touches of a cargo.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{cargo::TrackingId, location::UnLocode, voyage::VoyageNumber};

/// What happened to the cargo.
///
/// `NotHandled` is the zero value: it never appears in a recorded history
/// and is rejected at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandlingEventType {
    #[default]
    NotHandled,
    Receive,
    Load,
    Unload,
    Customs,
    Claim,
}

impl HandlingEventType {
    /// Parses a case-insensitive event type name.
    /// Anything unrecognised is `NotHandled`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "receive" => Self::Receive,
            "load" => Self::Load,
            "unload" => Self::Unload,
            "customs" => Self::Customs,
            "claim" => Self::Claim,
            _ => Self::NotHandled,
        }
    }

    /// Load and unload happen on a voyage; the rest only at a location.
    pub fn requires_voyage(self) -> bool {
        matches!(self, Self::Load | Self::Unload)
    }
}

impl fmt::Display for HandlingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotHandled => "NotHandled",
            Self::Receive => "Receive",
            Self::Load => "Load",
            Self::Unload => "Unload",
            Self::Customs => "Customs",
            Self::Claim => "Claim",
        };
        f.write_str(name)
    }
}

/// A handling step: either the effect of an observed event or the plan's
/// prediction of the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlingActivity {
    #[serde(rename = "type")]
    pub kind: HandlingEventType,
    pub location: UnLocode,
    pub voyage_number: Option<VoyageNumber>,
}

impl HandlingActivity {
    /// An activity that happens at a location only.
    pub fn at(kind: HandlingEventType, location: UnLocode) -> Self {
        Self {
            kind,
            location,
            voyage_number: None,
        }
    }

    /// An activity that happens on a voyage at a location.
    pub fn on_voyage(kind: HandlingEventType, location: UnLocode, voyage: VoyageNumber) -> Self {
        Self {
            kind,
            location,
            voyage_number: Some(voyage),
        }
    }
}

/// An immutable record of something that happened to a cargo.
///
/// `completed_at` is when it happened in the world; `registered_at` is when
/// the system heard about it. Events may be reported late, so derivation
/// orders by completion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlingEvent {
    pub tracking_id: TrackingId,
    pub activity: HandlingActivity,
    pub registered_at: Timestamp,
    pub completed_at: Timestamp,
}

/// The append-only log of handling events for one cargo, in registration
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlingHistory {
    events: Vec<HandlingEvent>,
}

impl HandlingHistory {
    pub fn new(events: Vec<HandlingEvent>) -> Self {
        Self { events }
    }

    /// Events in registration order.
    pub fn events(&self) -> &[HandlingEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn append(&mut self, event: HandlingEvent) {
        self.events.push(event);
    }

    /// The event that happened last in the world.
    ///
    /// Among events completed at the same instant the one registered last wins.
    pub fn most_recently_completed_event(&self) -> Option<&HandlingEvent> {
        // `max_by_key` returns the last of several equal maxima.
        self.events.iter().max_by_key(|e| e.completed_at)
    }
}
