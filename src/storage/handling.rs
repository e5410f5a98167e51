//! Handling event storage: append and load handling histories.

use rusqlite::Connection;

use crate::model::{
    HandlingActivity, HandlingEvent, HandlingEventType, HandlingHistory, TrackingId, UnLocode,
    VoyageNumber,
};
use crate::repository::HandlingEventRepository;

use super::{Result, Storage, StorageError, parse_timestamp};

impl HandlingEventRepository for Storage {
    fn append(&self, event: &HandlingEvent) -> crate::Result<()> {
        let conn = self.conn.lock();
        append_event(&conn, event)?;
        Ok(())
    }

    fn query_history(&self, tracking_id: &TrackingId) -> crate::Result<HandlingHistory> {
        let conn = self.conn.lock();
        Ok(load_history(&conn, tracking_id)?)
    }
}

fn append_event(conn: &Connection, event: &HandlingEvent) -> Result<()> {
    conn.execute(
        "INSERT INTO handling_event
             (tracking_id, event_type, location, voyage_number, registered_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            event.tracking_id.as_str(),
            event.activity.kind.to_string(),
            event.activity.location.as_str(),
            event.activity.voyage_number.as_ref().map(VoyageNumber::as_str),
            event.registered_at.to_string(),
            event.completed_at.to_string(),
        ],
    )?;
    Ok(())
}

/// Loads a cargo's events in registration order.
pub(super) fn load_history(conn: &Connection, tracking_id: &TrackingId) -> Result<HandlingHistory> {
    let mut stmt = conn.prepare(
        "SELECT event_type, location, voyage_number, registered_at, completed_at
         FROM handling_event WHERE tracking_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([tracking_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut events = Vec::with_capacity(rows.len());
    for (event_type, location, voyage, registered_at, completed_at) in rows {
        let kind = HandlingEventType::parse(&event_type);
        if kind == HandlingEventType::NotHandled {
            return Err(StorageError::Corrupt(format!(
                "invalid event_type: {event_type}"
            )));
        }
        events.push(HandlingEvent {
            tracking_id: tracking_id.clone(),
            activity: HandlingActivity {
                kind,
                location: UnLocode::new(location),
                voyage_number: voyage.map(VoyageNumber::new),
            },
            registered_at: parse_timestamp(&registered_at, "registered_at")?,
            completed_at: parse_timestamp(&completed_at, "completed_at")?,
        });
    }
    Ok(HandlingHistory::new(events))
}
