//! Issue CRUD, filtering, and statistics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use beads_core::content_hash::compute_content_hash;
use beads_core::enums::Upstream;
use beads_core::filter::IssueFilter;
use beads_core::issue::Issue;

use crate::error::{Result, StorageError};
use crate::traits::{Outcome, Statistics};

const ISSUE_COLUMNS: &str = "id, content_hash, title, body, status, issue_type, priority, \
    labels, assignees, milestone_id, epic_id, created_at, updated_at, closed_at, close_reason";

fn scan_issue(row: &Row, conn: &Connection) -> rusqlite::Result<Issue> {
    let id: String = row.get("id")?;
    let labels_json: String = row.get("labels")?;
    let assignees_json: String = row.get("assignees")?;
    let closed_at: Option<String> = row.get("closed_at")?;

    let external_refs = load_external_refs(conn, &id).unwrap_or_default();

    Ok(Issue {
        id: id.clone(),
        content_hash: row.get("content_hash")?,
        title: row.get("title")?,
        body: row.get("body")?,
        status: row.get::<_, String>("status")?.into(),
        issue_type: row.get::<_, String>("issue_type")?.into(),
        priority: row.get("priority")?,
        labels: serde_json::from_str(&labels_json).unwrap_or_default(),
        assignees: serde_json::from_str(&assignees_json).unwrap_or_default(),
        milestone_id: row.get("milestone_id")?,
        epic_id: row.get("epic_id")?,
        external_refs,
        created_at: parse_ts(&row.get::<_, String>("created_at")?),
        updated_at: parse_ts(&row.get::<_, String>("updated_at")?),
        closed_at: closed_at.map(|s| parse_ts(&s)),
        close_reason: row.get("close_reason")?,
    })
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn load_external_refs(conn: &Connection, issue_id: &str) -> Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT upstream, upstream_id FROM ext_ref WHERE issue_id = ?1")?;
    let rows = stmt.query_map(params![issue_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut map = HashMap::new();
    for r in rows {
        let (upstream, upstream_id) = r?;
        map.insert(upstream, upstream_id);
    }
    Ok(map)
}

pub(crate) fn get_issue_on_conn(conn: &Connection, id: &str) -> Result<Issue> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| scan_issue(row, conn))
        .optional()?
        .ok_or_else(|| StorageError::not_found("issue", id))
}

pub(crate) fn find_by_ext_on_conn(
    conn: &Connection,
    upstream: Upstream,
    upstream_id: &str,
) -> Result<Issue> {
    let issue_id: Option<String> = conn
        .query_row(
            "SELECT issue_id FROM ext_ref WHERE upstream = ?1 AND upstream_id = ?2",
            params![upstream.as_str(), upstream_id],
            |row| row.get(0),
        )
        .optional()?;

    match issue_id {
        Some(id) => get_issue_on_conn(conn, &id),
        None => Err(StorageError::not_found(
            "issue",
            format!("{}:{}", upstream.as_str(), upstream_id),
        )),
    }
}

pub(crate) fn list_issues_on_conn(conn: &Connection, filter: &IssueFilter) -> Result<Vec<Issue>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(status) = &filter.status {
        clauses.push(format!("status = ?{}", param_values.len() + 1));
        param_values.push(Box::new(status.as_str().to_string()));
    }
    if let Some(issue_type) = &filter.issue_type {
        clauses.push(format!("issue_type = ?{}", param_values.len() + 1));
        param_values.push(Box::new(issue_type.as_str().to_string()));
    }
    if let Some(priority) = filter.priority {
        clauses.push(format!("priority = ?{}", param_values.len() + 1));
        param_values.push(Box::new(priority));
    }
    if let Some(milestone_id) = &filter.milestone_id {
        clauses.push(format!("milestone_id = ?{}", param_values.len() + 1));
        param_values.push(Box::new(milestone_id.clone()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues {where_clause} ORDER BY created_at");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| scan_issue(row, conn))?;

    let mut issues = Vec::new();
    for r in rows {
        issues.push(r?);
    }

    // Post-filter in Rust: labels_any (OR semantics) and assignee membership,
    // neither of which is indexable against the JSON-encoded columns.
    if !filter.labels_any.is_empty() {
        issues.retain(|i| i.labels.iter().any(|l| filter.labels_any.contains(l)));
    }
    if let Some(assignee) = &filter.assignee {
        issues.retain(|i| i.assignees.iter().any(|a| a == assignee));
    }

    Ok(issues)
}

pub(crate) fn upsert_issue_on_conn(
    conn: &Connection,
    issue: &Issue,
    guard: Option<DateTime<Utc>>,
) -> Result<Outcome> {
    let existing = get_issue_on_conn(conn, &issue.id).ok();

    if let Some(existing) = &existing {
        if let Some(expected) = guard {
            if existing.updated_at != expected {
                return Err(StorageError::StaleWrite {
                    id: issue.id.clone(),
                    expected: expected.to_rfc3339(),
                    actual: existing.updated_at.to_rfc3339(),
                });
            }
        }
    }

    let mut issue = issue.clone();
    issue.content_hash = compute_content_hash(&issue);

    if let Some(existing) = &existing {
        if existing.content_hash == issue.content_hash {
            return Ok(Outcome::Unchanged);
        }
    }

    issue.updated_at = Utc::now();

    let labels_json = serde_json::to_string(&issue.labels)?;
    let assignees_json = serde_json::to_string(&issue.assignees)?;

    conn.execute(
        "INSERT INTO issues (
            id, content_hash, title, body, status, issue_type, priority,
            labels, assignees, milestone_id, epic_id, created_at, updated_at,
            closed_at, close_reason
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)
        ON CONFLICT(id) DO UPDATE SET
            content_hash = excluded.content_hash,
            title = excluded.title,
            body = excluded.body,
            status = excluded.status,
            issue_type = excluded.issue_type,
            priority = excluded.priority,
            labels = excluded.labels,
            assignees = excluded.assignees,
            milestone_id = excluded.milestone_id,
            epic_id = excluded.epic_id,
            updated_at = excluded.updated_at,
            closed_at = excluded.closed_at,
            close_reason = excluded.close_reason",
        params![
            issue.id,
            issue.content_hash,
            issue.title,
            issue.body,
            issue.status.as_str(),
            issue.issue_type.as_str(),
            issue.priority,
            labels_json,
            assignees_json,
            issue.milestone_id,
            issue.epic_id,
            issue.created_at.to_rfc3339(),
            issue.updated_at.to_rfc3339(),
            issue.closed_at.map(|t| t.to_rfc3339()),
            issue.close_reason,
        ],
    )?;

    conn.execute("DELETE FROM ext_ref WHERE issue_id = ?1", params![issue.id])?;
    for (upstream, upstream_id) in &issue.external_refs {
        conn.execute(
            "INSERT INTO ext_ref (issue_id, upstream, upstream_id) VALUES (?1,?2,?3)",
            params![issue.id, upstream, upstream_id],
        )?;
    }

    let saved = get_issue_on_conn(conn, &issue.id)?;
    Ok(if existing.is_some() {
        Outcome::Updated(saved)
    } else {
        Outcome::Created(saved)
    })
}

pub(crate) fn close_issue_on_conn(conn: &Connection, id: &str, reason: &str) -> Result<()> {
    let issue = get_issue_on_conn(conn, id)?;
    if issue.status == beads_core::enums::Status::Closed {
        return Ok(()); // idempotent
    }
    conn.execute(
        "UPDATE issues SET status = 'closed', closed_at = ?1, close_reason = ?2, updated_at = ?1 WHERE id = ?3",
        params![Utc::now().to_rfc3339(), reason, id],
    )?;
    Ok(())
}

pub(crate) fn delete_issue_on_conn(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM issues WHERE id = ?1", params![id])?;
    Ok(())
}

pub(crate) fn statistics_on_conn(conn: &Connection) -> Result<Statistics> {
    let mut stats = Statistics::default();

    stats.total_issues = conn.query_row("SELECT COUNT(*) FROM issues", [], |r| r.get(0))?;
    stats.open_issues = conn.query_row(
        "SELECT COUNT(*) FROM issues WHERE status = 'open'",
        [],
        |r| r.get(0),
    )?;
    stats.in_progress_issues = conn.query_row(
        "SELECT COUNT(*) FROM issues WHERE status = 'in_progress'",
        [],
        |r| r.get(0),
    )?;
    stats.closed_issues = conn.query_row(
        "SELECT COUNT(*) FROM issues WHERE status = 'closed'",
        [],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare("SELECT issue_type, COUNT(*) FROM issues GROUP BY issue_type")?;
    stats.by_type = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare("SELECT priority, COUNT(*) FROM issues GROUP BY priority")?;
    stats.by_priority = stmt
        .query_map([], |r| Ok((r.get::<_, i32>(0)?, r.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(stats)
}
