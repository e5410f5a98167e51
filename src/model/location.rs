//! Locations: ports identified by UN/LOCODE.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A United Nations location code, e.g. `SESTO` for Stockholm.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnLocode(String);

impl UnLocode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UnLocode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnLocode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// A port in the transport network. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub un_locode: UnLocode,
    pub name: String,
}

impl Location {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            un_locode: UnLocode::new(code),
            name: name.to_string(),
        }
    }
}

/// The sample ports the in-memory location table is seeded with.
pub fn sample_locations() -> Vec<Location> {
    vec![
        Location::new("USCHI", "Chicago"),
        Location::new("SESTO", "Stockholm"),
        Location::new("AUMEL", "Melbourne"),
        Location::new("CNHKG", "Hongkong"),
        Location::new("USNYC", "New York"),
        Location::new("JNTKO", "Tokyo"),
        Location::new("DEHAM", "Hamburg"),
        Location::new("NLRTM", "Rotterdam"),
        Location::new("FIHEL", "Helsinki"),
    ]
}
