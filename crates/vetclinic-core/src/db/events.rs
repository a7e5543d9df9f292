//! Domain event outbox.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{format_timestamp, parse_timestamp, Database, DbResult};
use crate::models::DomainEvent;

/// An event as stored in the outbox.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub seq: i64,
    pub event: DomainEvent,
    pub recorded_at: DateTime<Utc>,
}

impl Database {
    /// Append drained events to the outbox, in order.
    pub fn append_events(
        &self,
        events: &[DomainEvent],
        recorded_at: DateTime<Utc>,
    ) -> DbResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.write(|| self.insert_events(events, recorded_at))
    }

    /// Insert outbox rows on the current connection state. Callers provide
    /// the transaction.
    pub(super) fn insert_events(
        &self,
        events: &[DomainEvent],
        recorded_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO domain_events (
                aggregate_id, clinic_id, event_type, payload, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;
        for event in events {
            stmt.execute(params![
                event.aggregate_id(),
                event.clinic_id(),
                event.event_type(),
                serde_json::to_string(event)?,
                format_timestamp(recorded_at),
            ])?;
        }
        Ok(())
    }

    /// All events with a sequence number greater than `after_seq`.
    pub fn list_events(&self, after_seq: i64) -> DbResult<Vec<StoredEvent>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT seq, payload, recorded_at
            FROM domain_events
            WHERE seq > ?
            ORDER BY seq
            "#,
        )?;

        let rows = stmt.query_map([after_seq], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (seq, payload, recorded_at) = row?;
            events.push(StoredEvent {
                seq,
                event: serde_json::from_str(&payload)?,
                recorded_at: parse_timestamp(&recorded_at)?,
            });
        }
        Ok(events)
    }
}
