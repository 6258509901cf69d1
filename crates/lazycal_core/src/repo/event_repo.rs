//! SQLite-backed persistence adapter for event snapshots.
//!
//! # Responsibility
//! - Store whole snapshots in the `events` table, one row per slot.
//! - Rebuild snapshots from rows in `(date, slot)` order.
//!
//! # Invariants
//! - `save` replaces the table content atomically; readers never see a mix of
//!   two snapshots.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{open_db, open_db_in_memory};
use crate::model::event::{Event, Priority};
use crate::model::time;
use crate::persistence::{EventPersistence, PersistError, PersistResult};
use crate::store::event_store::{format_date_key, parse_date_key, DateKey, EventSnapshot};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const EVENT_SELECT_SQL: &str = "SELECT
    event_date,
    slot,
    title,
    description,
    event_time,
    priority
FROM events
ORDER BY event_date ASC, slot ASC";

/// Metadata of the last successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRecord {
    /// Unix epoch milliseconds.
    pub saved_at: i64,
    pub date_count: usize,
    pub event_count: usize,
}

/// Persistence port implementation over one owned SQLite connection.
pub struct SqliteEventPersistence {
    conn: Connection,
}

impl SqliteEventPersistence {
    /// Wraps an already migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> PersistResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns metadata of the last successful save, if any.
    pub fn last_save(&self) -> PersistResult<Option<SaveRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT saved_at, date_count, event_count FROM snapshot_saves WHERE id = 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        record
            .map(|(saved_at, date_count, event_count)| {
                Ok(SaveRecord {
                    saved_at,
                    date_count: count_from_db(date_count, "snapshot_saves.date_count")?,
                    event_count: count_from_db(event_count, "snapshot_saves.event_count")?,
                })
            })
            .transpose()
    }
}

impl EventPersistence for SqliteEventPersistence {
    fn load(&self) -> PersistResult<Option<EventSnapshot>> {
        let mut stmt = self.conn.prepare(EVENT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut buckets: Vec<(DateKey, Vec<Event>)> = Vec::new();

        while let Some(row) = rows.next()? {
            let (date, event) = parse_event_row(row)?;
            match buckets.last_mut() {
                Some((last_date, events)) if *last_date == date => events.push(event),
                _ => buckets.push((date, vec![event])),
            }
        }

        if buckets.is_empty() && self.last_save()?.is_none() {
            return Ok(None);
        }
        Ok(Some(EventSnapshot::from_buckets(buckets)))
    }

    fn save(&self, snapshot: &EventSnapshot) -> PersistResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM events;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO events (
                    event_date,
                    slot,
                    title,
                    description,
                    event_time,
                    priority
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for (date, events) in snapshot.iter() {
                let date_text = format_date_key(date);
                for (slot, event) in events.iter().enumerate() {
                    insert.execute(params![
                        date_text.as_str(),
                        slot as i64,
                        event.title(),
                        event.description(),
                        event.time().to_string(),
                        event.priority().label(),
                    ])?;
                }
            }
        }
        tx.execute(
            "INSERT INTO snapshot_saves (id, saved_at, date_count, event_count)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                saved_at = excluded.saved_at,
                date_count = excluded.date_count,
                event_count = excluded.event_count;",
            params![
                Utc::now().timestamp_millis(),
                snapshot.date_count() as i64,
                snapshot.event_count() as i64,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_event_row(row: &Row<'_>) -> PersistResult<(DateKey, Event)> {
    let date_text: String = row.get("event_date")?;
    let date = parse_date_key(&date_text).map_err(|_| {
        PersistError::InvalidData(format!(
            "invalid date `{date_text}` in events.event_date"
        ))
    })?;

    let time_text: String = row.get("event_time")?;
    let parsed_time = time::parse(&time_text).map_err(|err| {
        PersistError::InvalidData(format!("{err} in events.event_time for {date_text}"))
    })?;

    let priority_text: String = row.get("priority")?;
    let event = Event::with_time(
        row.get::<_, String>("title")?,
        row.get::<_, String>("description")?,
        parsed_time,
        Priority::from_label(&priority_text),
    );
    Ok((date, event))
}

fn count_from_db(value: i64, column: &str) -> PersistResult<usize> {
    usize::try_from(value)
        .map_err(|_| PersistError::InvalidData(format!("invalid count `{value}` in {column}")))
}
