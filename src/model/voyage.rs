//! Voyage types: scheduled carrier movements between ports.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::location::UnLocode;

/// Identifies a voyage, e.g. `V100`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoyageNumber(String);

impl VoyageNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VoyageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoyageNumber {
    fn from(number: &str) -> Self {
        Self::new(number)
    }
}

/// A single vessel movement from one port to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierMovement {
    pub departure_location: UnLocode,
    pub arrival_location: UnLocode,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
}

/// An ordered sequence of carrier movements.
///
/// Movements are expected to be consecutive (each arrival is the next
/// departure) but this is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub carrier_movements: Vec<CarrierMovement>,
}

/// A scheduled voyage. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voyage {
    pub number: VoyageNumber,
    pub schedule: Schedule,
}

impl Voyage {
    pub fn new(number: &str, schedule: Schedule) -> Self {
        Self {
            number: VoyageNumber::new(number),
            schedule,
        }
    }
}

/// Midnight UTC on the given day of March 2009. Days past 31 roll into April.
const fn march_2009(day: i64) -> Timestamp {
    Timestamp::constant(1_235_865_600 + (day - 1) * 86_400, 0)
}

fn movement(from: &str, to: &str, departs: i64, arrives: i64) -> CarrierMovement {
    CarrierMovement {
        departure_location: UnLocode::new(from),
        arrival_location: UnLocode::new(to),
        departure_time: march_2009(departs),
        arrival_time: march_2009(arrives),
    }
}

/// The sample voyages the in-memory voyage table is seeded with.
///
/// The voyages with empty schedules are referenced by external pathfinders
/// and only need to exist.
pub fn sample_voyages() -> Vec<Voyage> {
    let scheduled = [
        (
            "V100",
            vec![
                movement("CNHKG", "JNTKO", 3, 5),
                movement("JNTKO", "USNYC", 6, 9),
            ],
        ),
        (
            "V200",
            vec![
                movement("USNYC", "USCHI", 10, 12),
                movement("USCHI", "SESTO", 13, 16),
            ],
        ),
        (
            "V300",
            vec![
                movement("JNTKO", "NLRTM", 8, 16),
                movement("NLRTM", "DEHAM", 17, 18),
                movement("DEHAM", "AUMEL", 19, 32),
                movement("AUMEL", "JNTKO", 33, 38),
            ],
        ),
        (
            "V400",
            vec![
                movement("DEHAM", "SESTO", 14, 15),
                movement("SESTO", "FIHEL", 16, 17),
                movement("FIHEL", "DEHAM", 18, 20),
            ],
        ),
    ];

    let mut voyages: Vec<Voyage> = scheduled
        .into_iter()
        .map(|(number, carrier_movements)| Voyage::new(number, Schedule { carrier_movements }))
        .collect();

    for number in ["0100S", "0200T", "0300A", "0301S", "0400S"] {
        voyages.push(Voyage::new(number, Schedule::default()));
    }

    voyages
}
