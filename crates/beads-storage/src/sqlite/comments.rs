//! Comment CRUD and cross-upstream comment mirroring (I7).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use beads_core::comment::Comment;
use beads_core::comment_mapping::CommentMapping;
use beads_core::enums::Upstream;

use crate::error::Result;

pub(crate) fn add_comment_on_conn(
    conn: &Connection,
    issue_id: &str,
    author: &str,
    text: &str,
) -> Result<Comment> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO comments (issue_id, author, text, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![issue_id, author, text, now.to_rfc3339()],
    )?;
    Ok(Comment {
        id: conn.last_insert_rowid(),
        issue_id: issue_id.to_string(),
        author: author.to_string(),
        text: text.to_string(),
        created_at: now,
    })
}

pub(crate) fn get_comments_on_conn(conn: &Connection, issue_id: &str) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, issue_id, author, text, created_at FROM comments \
         WHERE issue_id = ?1 ORDER BY created_at",
    )?;
    let rows = stmt.query_map(params![issue_id], |row| {
        let created_at: String = row.get(4)?;
        Ok(Comment {
            id: row.get(0)?,
            issue_id: row.get(1)?,
            author: row.get(2)?,
            text: row.get(3)?,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
}

pub(crate) fn map_comment_on_conn(
    conn: &Connection,
    comment_id: i64,
    upstream: Upstream,
    upstream_comment_id: &str,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO comment_map (comment_id, upstream, upstream_comment_id, synced_at) \
         VALUES (?1, ?2, ?3, ?4)",
        params![comment_id, upstream.as_str(), upstream_comment_id, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

pub(crate) fn find_comment_mapping_on_conn(
    conn: &Connection,
    comment_id: i64,
    upstream: Upstream,
) -> Result<Option<CommentMapping>> {
    conn.query_row(
        "SELECT comment_id, upstream, upstream_comment_id, synced_at FROM comment_map \
         WHERE comment_id = ?1 AND upstream = ?2",
        params![comment_id, upstream.as_str()],
        |row| {
            let synced_at: String = row.get(3)?;
            Ok(CommentMapping {
                comment_id: row.get(0)?,
                upstream: row.get::<_, String>(1)?.into(),
                upstream_comment_id: row.get(2)?,
                synced_at: chrono::DateTime::parse_from_rfc3339(&synced_at)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        },
    )
    .optional()
    .map_err(Into::into)
}
