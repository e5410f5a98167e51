//! Cargo storage: route specification and itinerary rows.

use rusqlite::{Connection, OptionalExtension};

use crate::error::Error;
use crate::model::{
    Cargo, Delivery, Itinerary, Leg, RouteSpecification, TrackingId, UnLocode, VoyageNumber,
};
use crate::repository::CargoRepository;

use super::{Result, Storage, StorageError, handling::load_history, parse_timestamp};

impl CargoRepository for Storage {
    fn find(&self, tracking_id: &TrackingId) -> crate::Result<Cargo> {
        let conn = self.conn.lock();
        load_cargo(&conn, tracking_id)?.ok_or_else(|| Error::UnknownCargo(tracking_id.clone()))
    }

    fn store(&self, cargo: &Cargo) -> crate::Result<()> {
        let mut conn = self.conn.lock();
        store_cargo(&mut conn, cargo)?;
        Ok(())
    }

    fn find_all(&self) -> crate::Result<Vec<Cargo>> {
        let conn = self.conn.lock();
        Ok(load_all(&conn)?)
    }

    fn tracking_ids(&self) -> crate::Result<Vec<TrackingId>> {
        let conn = self.conn.lock();
        Ok(load_tracking_ids(&conn)?)
    }
}

/// Replaces the cargo row and its legs in one transaction.
fn store_cargo(conn: &mut Connection, cargo: &Cargo) -> Result<()> {
    let tx = conn.transaction()?;
    let spec = &cargo.route_specification;
    tx.execute(
        "INSERT INTO cargo (tracking_id, origin, spec_origin, destination, arrival_deadline)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (tracking_id) DO UPDATE SET
             spec_origin = excluded.spec_origin,
             destination = excluded.destination,
             arrival_deadline = excluded.arrival_deadline",
        rusqlite::params![
            cargo.tracking_id.as_str(),
            cargo.origin.as_str(),
            spec.origin.as_str(),
            spec.destination.as_str(),
            spec.arrival_deadline.map(|t| t.to_string()),
        ],
    )?;

    tx.execute(
        "DELETE FROM leg WHERE tracking_id = ?1",
        [cargo.tracking_id.as_str()],
    )?;
    for (position, leg) in cargo.itinerary.legs.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|e| StorageError::Corrupt(format!("leg position: {e}")))?;
        tx.execute(
            "INSERT INTO leg (tracking_id, position, voyage_number, load_location,
                              unload_location, load_time, unload_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                cargo.tracking_id.as_str(),
                position,
                leg.voyage_number.as_str(),
                leg.load_location.as_str(),
                leg.unload_location.as_str(),
                leg.load_time.to_string(),
                leg.unload_time.to_string(),
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn load_all(conn: &Connection) -> Result<Vec<Cargo>> {
    let ids = load_tracking_ids(conn)?;

    let mut cargos = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(cargo) = load_cargo(conn, &id)? {
            cargos.push(cargo);
        }
    }
    Ok(cargos)
}

fn load_tracking_ids(conn: &Connection) -> Result<Vec<TrackingId>> {
    let mut stmt = conn.prepare("SELECT tracking_id FROM cargo ORDER BY tracking_id")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .map(|id| id.map(TrackingId::new))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// Loads a cargo and derives its delivery from the stored history.
fn load_cargo(conn: &Connection, tracking_id: &TrackingId) -> Result<Option<Cargo>> {
    let row = conn
        .query_row(
            "SELECT origin, spec_origin, destination, arrival_deadline
             FROM cargo WHERE tracking_id = ?1",
            [tracking_id.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((origin, spec_origin, destination, deadline)) = row else {
        return Ok(None);
    };

    let route_specification = RouteSpecification {
        origin: UnLocode::new(spec_origin),
        destination: UnLocode::new(destination),
        arrival_deadline: deadline
            .as_deref()
            .map(|d| parse_timestamp(d, "arrival_deadline"))
            .transpose()?,
    };
    let itinerary = load_itinerary(conn, tracking_id)?;
    let history = load_history(conn, tracking_id)?;
    let delivery = Delivery::derive(&route_specification, &itinerary, &history);

    Ok(Some(Cargo {
        tracking_id: tracking_id.clone(),
        origin: UnLocode::new(origin),
        route_specification,
        itinerary,
        delivery,
    }))
}

fn load_itinerary(conn: &Connection, tracking_id: &TrackingId) -> Result<Itinerary> {
    let mut stmt = conn.prepare(
        "SELECT voyage_number, load_location, unload_location, load_time, unload_time
         FROM leg WHERE tracking_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map([tracking_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut legs = Vec::with_capacity(rows.len());
    for (voyage, load_location, unload_location, load_time, unload_time) in rows {
        legs.push(Leg {
            voyage_number: VoyageNumber::new(voyage),
            load_location: UnLocode::new(load_location),
            unload_location: UnLocode::new(unload_location),
            load_time: parse_timestamp(&load_time, "load_time")?,
            unload_time: parse_timestamp(&unload_time, "unload_time")?,
        });
    }
    Ok(Itinerary::new(legs))
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::{
        HandlingActivity, HandlingEvent, HandlingEventType, RoutingStatus, TransportStatus,
    };
    use crate::repository::HandlingEventRepository;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("freight.sqlite")).unwrap();
        (dir, storage)
    }

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn sample_cargo() -> Cargo {
        Cargo::new(
            "ABC123".into(),
            RouteSpecification {
                origin: "CNHKG".into(),
                destination: "SESTO".into(),
                arrival_deadline: Some(at("2009-03-18T00:00:00Z")),
            },
        )
    }

    fn sample_itinerary() -> Itinerary {
        Itinerary::new(vec![
            Leg {
                voyage_number: "V100".into(),
                load_location: "CNHKG".into(),
                unload_location: "USNYC".into(),
                load_time: at("2009-03-03T00:00:00Z"),
                unload_time: at("2009-03-09T00:00:00Z"),
            },
            Leg {
                voyage_number: "V200".into(),
                load_location: "USNYC".into(),
                unload_location: "SESTO".into(),
                load_time: at("2009-03-10T00:00:00Z"),
                unload_time: at("2009-03-16T00:00:00Z"),
            },
        ])
    }

    #[test]
    fn store_and_find_cargo() {
        let (_dir, storage) = test_storage();
        let cargo = sample_cargo();

        storage.store(&cargo).unwrap();
        let loaded = storage.find(&cargo.tracking_id).unwrap();

        assert_eq!(loaded.tracking_id, cargo.tracking_id);
        assert_eq!(loaded.origin, cargo.origin);
        assert_eq!(loaded.route_specification, cargo.route_specification);
        assert!(loaded.itinerary.is_empty());
    }

    #[test]
    fn find_unknown_cargo_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.find(&"NOPE".into()).unwrap_err();

        assert!(matches!(err, Error::UnknownCargo(_)));
    }

    #[test]
    fn store_replaces_itinerary_and_route() {
        let (_dir, storage) = test_storage();
        let mut cargo = sample_cargo();
        cargo.assign_to_route(sample_itinerary());
        storage.store(&cargo).unwrap();

        let loaded = storage.find(&cargo.tracking_id).unwrap();
        assert_eq!(loaded.itinerary, sample_itinerary());
        assert_eq!(loaded.delivery.routing_status, RoutingStatus::Routed);

        cargo.assign_to_route(Itinerary::new(sample_itinerary().legs[..1].to_vec()));
        cargo.specify_new_route(RouteSpecification {
            origin: "CNHKG".into(),
            destination: "USNYC".into(),
            arrival_deadline: None,
        });
        storage.store(&cargo).unwrap();

        let loaded = storage.find(&cargo.tracking_id).unwrap();
        assert_eq!(loaded.itinerary.legs.len(), 1);
        assert_eq!(loaded.route_specification.destination, UnLocode::from("USNYC"));
        assert_eq!(loaded.route_specification.arrival_deadline, None);
        assert_eq!(loaded.delivery.routing_status, RoutingStatus::Routed);
    }

    #[test]
    fn find_derives_delivery_from_stored_history() {
        let (_dir, storage) = test_storage();
        let mut cargo = sample_cargo();
        cargo.assign_to_route(sample_itinerary());
        storage.store(&cargo).unwrap();

        storage
            .append(&HandlingEvent {
                tracking_id: cargo.tracking_id.clone(),
                activity: HandlingActivity::on_voyage(
                    HandlingEventType::Load,
                    "CNHKG".into(),
                    "V100".into(),
                ),
                registered_at: Timestamp::now(),
                completed_at: at("2009-03-03T00:00:00Z"),
            })
            .unwrap();

        let loaded = storage.find(&cargo.tracking_id).unwrap();
        assert_eq!(
            loaded.delivery.transport_status,
            TransportStatus::OnboardCarrier
        );
        assert_eq!(loaded.delivery.current_voyage, Some("V100".into()));
    }

    #[test]
    fn find_all_returns_every_cargo_sorted() {
        let (_dir, storage) = test_storage();
        let mut second = sample_cargo();
        second.tracking_id = "ZZZ999".into();

        storage.store(&second).unwrap();
        storage.store(&sample_cargo()).unwrap();

        let all = storage.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].tracking_id, TrackingId::from("ABC123"));
        assert_eq!(all[1].tracking_id, TrackingId::from("ZZZ999"));
    }

    #[test]
    fn tracking_ids_are_listed_without_loading_cargos() {
        let (_dir, storage) = test_storage();
        assert!(storage.tracking_ids().unwrap().is_empty());

        let mut second = sample_cargo();
        second.tracking_id = "ZZZ999".into();
        storage.store(&second).unwrap();
        storage.store(&sample_cargo()).unwrap();

        // A corrupt history would fail a full load, but not the id listing.
        storage
            .conn
            .lock()
            .execute(
                "INSERT INTO handling_event
                     (tracking_id, event_type, location, registered_at, completed_at)
                 VALUES ('ABC123', 'Teleport', 'CNHKG', ?1, ?1)",
                [Timestamp::UNIX_EPOCH.to_string()],
            )
            .unwrap();

        assert_eq!(
            storage.tracking_ids().unwrap(),
            [TrackingId::from("ABC123"), TrackingId::from("ZZZ999")]
        );
        assert!(storage.find_all().is_err());
    }

    #[test]
    fn storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("freight.sqlite");
        let cargo = sample_cargo();

        Storage::open(&path).unwrap().store(&cargo).unwrap();

        let reopened = Storage::open(&path).unwrap();
        assert!(reopened.find(&cargo.tracking_id).is_ok());
    }
}
