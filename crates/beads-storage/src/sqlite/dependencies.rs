//! Dependency edge operations: insertion with cycle/self-loop guards (I2, I3).

use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use rusqlite::{params, Connection};

use beads_core::dependency::DependencyEdge;
use beads_core::enums::DependencyType;

use crate::error::{Result, StorageError};

/// DFS (breadth-first, in practice) from `to` searching for `from`: if found,
/// adding `blocks(from, to)` would create a cycle. Applies to `kind = Blocks`
/// only -- I3 constrains the `blocks` subgraph, not `parent-child`/`related`.
fn would_cycle_on_conn(conn: &Connection, from: &str, to: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT to_id FROM dep_edges WHERE from_id = ?1 AND kind = 'blocks'")?;
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(to.to_string());

    while let Some(node) = queue.pop_front() {
        if node == from {
            return Ok(true);
        }
        if !visited.insert(node.clone()) {
            continue;
        }
        let next: Vec<String> = stmt
            .query_map(params![node], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        queue.extend(next);
    }

    Ok(false)
}

pub(crate) fn add_edge_on_conn(
    conn: &Connection,
    from: &str,
    to: &str,
    kind: DependencyType,
) -> Result<()> {
    if from == to {
        return Err(StorageError::SelfLoop { id: from.to_string() });
    }

    let endpoint_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM issues WHERE id IN (?1, ?2)",
        params![from, to],
        |row| row.get(0),
    )?;
    if endpoint_count < 2 {
        let missing = if conn
            .query_row("SELECT 1 FROM issues WHERE id = ?1", params![from], |_| Ok(()))
            .is_err()
        {
            from
        } else {
            to
        };
        return Err(StorageError::Missing { id: missing.to_string() });
    }

    if kind == DependencyType::Blocks && would_cycle_on_conn(conn, from, to)? {
        return Err(StorageError::Cycle {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    conn.execute(
        "INSERT OR IGNORE INTO dep_edges (from_id, to_id, kind, created_at, created_by) \
         VALUES (?1, ?2, ?3, ?4, '')",
        params![from, to, kind.as_str(), Utc::now().to_rfc3339()],
    )?;

    Ok(())
}

pub(crate) fn delete_edge_on_conn(
    conn: &Connection,
    from: &str,
    to: &str,
    kind: DependencyType,
) -> Result<()> {
    conn.execute(
        "DELETE FROM dep_edges WHERE from_id = ?1 AND to_id = ?2 AND kind = ?3",
        params![from, to, kind.as_str()],
    )?;
    Ok(())
}

pub(crate) fn all_edges_on_conn(conn: &Connection) -> Result<Vec<DependencyEdge>> {
    let mut stmt =
        conn.prepare("SELECT from_id, to_id, kind, created_at, created_by FROM dep_edges")?;
    let rows = stmt.query_map([], |row| {
        let created_at: String = row.get(3)?;
        Ok(DependencyEdge {
            from: row.get(0)?,
            to: row.get(1)?,
            kind: row.get::<_, String>(2)?.into(),
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            created_by: row.get(4)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}
