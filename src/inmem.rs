//! In-memory implementations of the repository traits.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::model::{
    Cargo, HandlingEvent, HandlingHistory, Location, TrackingId, UnLocode, Voyage, VoyageNumber,
    sample_locations, sample_voyages,
};
use crate::repository::{
    CargoRepository, HandlingEventRepository, LocationRepository, VoyageRepository,
};

#[derive(Debug, Default)]
pub struct InMemoryCargoRepository {
    cargos: RwLock<HashMap<TrackingId, Cargo>>,
}

impl InMemoryCargoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CargoRepository for InMemoryCargoRepository {
    fn find(&self, tracking_id: &TrackingId) -> Result<Cargo> {
        self.cargos
            .read()
            .get(tracking_id)
            .cloned()
            .ok_or_else(|| Error::UnknownCargo(tracking_id.clone()))
    }

    fn store(&self, cargo: &Cargo) -> Result<()> {
        self.cargos
            .write()
            .insert(cargo.tracking_id.clone(), cargo.clone());
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Cargo>> {
        let mut cargos: Vec<Cargo> = self.cargos.read().values().cloned().collect();
        cargos.sort_by(|a, b| a.tracking_id.cmp(&b.tracking_id));
        Ok(cargos)
    }

    fn tracking_ids(&self) -> Result<Vec<TrackingId>> {
        let mut ids: Vec<TrackingId> = self.cargos.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHandlingEventRepository {
    events: RwLock<HashMap<TrackingId, Vec<HandlingEvent>>>,
}

impl InMemoryHandlingEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandlingEventRepository for InMemoryHandlingEventRepository {
    fn append(&self, event: &HandlingEvent) -> Result<()> {
        self.events
            .write()
            .entry(event.tracking_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    fn query_history(&self, tracking_id: &TrackingId) -> Result<HandlingHistory> {
        let events = self
            .events
            .read()
            .get(tracking_id)
            .cloned()
            .unwrap_or_default();
        Ok(HandlingHistory::new(events))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLocationRepository {
    locations: HashMap<UnLocode, Location>,
}

impl InMemoryLocationRepository {
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        Self {
            locations: locations
                .into_iter()
                .map(|l| (l.un_locode.clone(), l))
                .collect(),
        }
    }

    /// Seeded with [`sample_locations`].
    pub fn with_samples() -> Self {
        Self::new(sample_locations())
    }
}

impl LocationRepository for InMemoryLocationRepository {
    fn find(&self, code: &UnLocode) -> Result<Location> {
        self.locations
            .get(code)
            .cloned()
            .ok_or_else(|| Error::UnknownLocation(code.clone()))
    }

    fn find_all(&self) -> Result<Vec<Location>> {
        let mut locations: Vec<Location> = self.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.un_locode.cmp(&b.un_locode));
        Ok(locations)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryVoyageRepository {
    voyages: HashMap<VoyageNumber, Voyage>,
}

impl InMemoryVoyageRepository {
    pub fn new(voyages: impl IntoIterator<Item = Voyage>) -> Self {
        Self {
            voyages: voyages
                .into_iter()
                .map(|v| (v.number.clone(), v))
                .collect(),
        }
    }

    /// Seeded with [`sample_voyages`].
    pub fn with_samples() -> Self {
        Self::new(sample_voyages())
    }
}

impl VoyageRepository for InMemoryVoyageRepository {
    fn find(&self, number: &VoyageNumber) -> Result<Voyage> {
        self.voyages
            .get(number)
            .cloned()
            .ok_or_else(|| Error::UnknownVoyage(number.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{HandlingActivity, HandlingEventType, RouteSpecification};

    fn sample_cargo(id: &str) -> Cargo {
        Cargo::new(
            id.into(),
            RouteSpecification {
                origin: "CNHKG".into(),
                destination: "SESTO".into(),
                arrival_deadline: None,
            },
        )
    }

    #[test]
    fn store_and_find_cargo() {
        let repo = InMemoryCargoRepository::new();
        repo.store(&sample_cargo("ABC123")).unwrap();

        let found = repo.find(&"ABC123".into()).unwrap();
        assert_eq!(found.tracking_id, TrackingId::from("ABC123"));
    }

    #[test]
    fn find_unknown_cargo_fails() {
        let repo = InMemoryCargoRepository::new();
        let err = repo.find(&"NOPE".into()).unwrap_err();

        assert!(matches!(err, Error::UnknownCargo(_)));
    }

    #[test]
    fn find_all_sorted_by_tracking_id() {
        let repo = InMemoryCargoRepository::new();
        repo.store(&sample_cargo("B")).unwrap();
        repo.store(&sample_cargo("A")).unwrap();

        let all = repo.find_all().unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.tracking_id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
        assert_eq!(repo.tracking_ids().unwrap(), [TrackingId::from("A"), "B".into()]);
    }

    #[test]
    fn history_keeps_registration_order_per_cargo() {
        let repo = InMemoryHandlingEventRepository::new();
        for (id, kind) in [
            ("ABC123", HandlingEventType::Receive),
            ("XYZ789", HandlingEventType::Receive),
            ("ABC123", HandlingEventType::Load),
        ] {
            repo.append(&HandlingEvent {
                tracking_id: id.into(),
                activity: HandlingActivity::at(kind, "CNHKG".into()),
                registered_at: Timestamp::now(),
                completed_at: Timestamp::now(),
            })
            .unwrap();
        }

        let history = repo.query_history(&"ABC123".into()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.events()[1].activity.kind, HandlingEventType::Load);
        assert!(repo.query_history(&"NEVER".into()).unwrap().is_empty());
    }

    #[test]
    fn sample_reference_data_is_seeded() {
        let locations = InMemoryLocationRepository::with_samples();
        assert_eq!(locations.find(&"SESTO".into()).unwrap().name, "Stockholm");
        assert!(matches!(
            locations.find(&"XXXXX".into()),
            Err(Error::UnknownLocation(_))
        ));

        let voyages = InMemoryVoyageRepository::with_samples();
        assert!(voyages.find(&"V100".into()).is_ok());
        assert!(voyages.find(&"0400S".into()).is_ok());
        assert!(matches!(
            voyages.find(&"V999".into()),
            Err(Error::UnknownVoyage(_))
        ));
    }
}
