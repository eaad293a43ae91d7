//! Milestone CRUD.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use beads_core::enums::MilestoneState;
use beads_core::milestone::Milestone;

use crate::error::{Result, StorageError};

fn scan_milestone(row: &Row) -> rusqlite::Result<Milestone> {
    let due_at: Option<String> = row.get("due_at")?;
    Ok(Milestone {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        state: row.get::<_, String>("state")?.into(),
        due_at: due_at.map(|s| parse_ts(&s)),
        created_at: parse_ts(&row.get::<_, String>("created_at")?),
        updated_at: parse_ts(&row.get::<_, String>("updated_at")?),
    })
}

fn parse_ts(s: &str) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn get_milestone_on_conn(conn: &Connection, id: &str) -> Result<Milestone> {
    conn.query_row(
        "SELECT id, title, description, state, due_at, created_at, updated_at \
         FROM milestones WHERE id = ?1",
        params![id],
        scan_milestone,
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("milestone", id))
}

pub(crate) fn list_milestones_on_conn(
    conn: &Connection,
    state: Option<MilestoneState>,
) -> Result<Vec<Milestone>> {
    let sql = "SELECT id, title, description, state, due_at, created_at, updated_at FROM milestones";
    let mut stmt;
    let rows: Vec<Milestone> = match state {
        Some(s) => {
            stmt = conn.prepare(&format!("{sql} WHERE state = ?1"))?;
            stmt.query_map(params![s.as_str()], scan_milestone)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
        None => {
            stmt = conn.prepare(sql)?;
            stmt.query_map([], scan_milestone)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(rows)
}

pub(crate) fn upsert_milestone_on_conn(conn: &Connection, milestone: &Milestone) -> Result<()> {
    conn.execute(
        "INSERT INTO milestones (id, title, description, state, due_at, created_at, updated_at) \
         VALUES (?1,?2,?3,?4,?5,?6,?7) \
         ON CONFLICT(id) DO UPDATE SET \
            title = excluded.title, \
            description = excluded.description, \
            state = excluded.state, \
            due_at = excluded.due_at, \
            updated_at = excluded.updated_at",
        params![
            milestone.id,
            milestone.title,
            milestone.description,
            milestone.state.as_str(),
            milestone.due_at.map(|t| t.to_rfc3339()),
            milestone.created_at.to_rfc3339(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;

    #[test]
    fn upsert_and_get_milestone() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        let milestone = Milestone::new("ms-1", "Launch");
        upsert_milestone_on_conn(&conn, &milestone).unwrap();

        let fetched = get_milestone_on_conn(&conn, "ms-1").unwrap();
        assert_eq!(fetched.title, "Launch");
        assert_eq!(fetched.state, MilestoneState::Open);
    }

    #[test]
    fn list_milestones_filters_by_state() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        upsert_milestone_on_conn(&conn, &Milestone::new("ms-1", "Open one")).unwrap();
        let mut closed = Milestone::new("ms-2", "Closed one");
        closed.state = MilestoneState::Closed;
        upsert_milestone_on_conn(&conn, &closed).unwrap();

        let open = list_milestones_on_conn(&conn, Some(MilestoneState::Open)).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "ms-1");
    }
}
