//! The append-only reconciliation ledger (SyncEvent).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use beads_core::sync_event::SyncEvent;

use crate::error::Result;

pub(crate) fn append_event_on_conn(conn: &Connection, event: &SyncEvent) -> Result<i64> {
    conn.execute(
        "INSERT INTO sync_events (issue_id, direction, upstream, payload_hash, outcome, error, created_at) \
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            event.issue_id,
            event.direction.as_str(),
            event.upstream.as_str(),
            event.payload_hash,
            event.outcome.as_str(),
            event.error,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn has_applied_payload_on_conn(conn: &Connection, payload_hash: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM sync_events WHERE payload_hash = ?1 AND outcome = 'applied' LIMIT 1",
            params![payload_hash],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn events_since_on_conn(conn: &Connection, since_id: i64) -> Result<Vec<SyncEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, issue_id, direction, upstream, payload_hash, outcome, error, created_at \
         FROM sync_events WHERE id > ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![since_id], |row| {
        Ok(SyncEvent {
            id: row.get(0)?,
            issue_id: row.get(1)?,
            direction: row.get::<_, String>(2)?.into(),
            upstream: row.get::<_, String>(3)?.into(),
            payload_hash: row.get(4)?,
            outcome: row.get::<_, String>(5)?.into(),
            error: row.get(6)?,
            created_at: {
                let s: String = row.get(7)?;
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now())
            },
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;
    use beads_core::enums::{SyncDirection, SyncOutcome, Upstream};

    fn sample_event(payload_hash: &str, outcome: SyncOutcome) -> SyncEvent {
        SyncEvent {
            id: 0,
            issue_id: "bd-1".into(),
            direction: SyncDirection::CanonicalToGithub,
            upstream: Upstream::Github,
            payload_hash: payload_hash.into(),
            outcome,
            error: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn append_and_read_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        let seq = append_event_on_conn(&conn, &sample_event("hash-1", SyncOutcome::Applied)).unwrap();
        assert_eq!(seq, 1);

        let events = events_since_on_conn(&conn, 0).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, SyncOutcome::Applied);
    }

    #[test]
    fn duplicate_payload_detected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        append_event_on_conn(&conn, &sample_event("hash-1", SyncOutcome::Applied)).unwrap();

        assert!(has_applied_payload_on_conn(&conn, "hash-1").unwrap());
        assert!(!has_applied_payload_on_conn(&conn, "hash-2").unwrap());
    }
}
