//! DDL statements and migrations for the SQLite schema.
//!
//! Timestamps are stored as TEXT in ISO 8601 format (SQLite has no native
//! datetime type). Sets and ordered lists (`labels`, `assignees`) are stored
//! as JSON-encoded TEXT columns.

/// Current schema version. Bumped whenever DDL or migrations change.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS issues (
        id           TEXT PRIMARY KEY,
        content_hash TEXT NOT NULL DEFAULT '',
        title        TEXT NOT NULL,
        body         TEXT NOT NULL DEFAULT '',
        status       TEXT NOT NULL DEFAULT 'open',
        issue_type   TEXT NOT NULL DEFAULT 'task',
        priority     INTEGER NOT NULL DEFAULT 2,
        labels       TEXT NOT NULL DEFAULT '[]',
        assignees    TEXT NOT NULL DEFAULT '[]',
        milestone_id TEXT,
        epic_id      TEXT,
        created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        closed_at    TEXT,
        close_reason TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status)",
    "CREATE INDEX IF NOT EXISTS idx_issues_priority ON issues(priority)",
    "CREATE INDEX IF NOT EXISTS idx_issues_issue_type ON issues(issue_type)",
    "CREATE INDEX IF NOT EXISTS idx_issues_milestone ON issues(milestone_id)",
    "CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS milestones (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        state       TEXT NOT NULL DEFAULT 'open',
        due_at      TEXT,
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dep_edges (
        from_id    TEXT NOT NULL,
        to_id      TEXT NOT NULL,
        kind       TEXT NOT NULL DEFAULT 'blocks',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        created_by TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (from_id, to_id, kind),
        FOREIGN KEY (from_id) REFERENCES issues(id) ON DELETE CASCADE,
        FOREIGN KEY (to_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_dep_edges_from ON dep_edges(from_id)",
    "CREATE INDEX IF NOT EXISTS idx_dep_edges_to ON dep_edges(to_id)",
    r#"
    CREATE TABLE IF NOT EXISTS ext_ref (
        issue_id    TEXT NOT NULL,
        upstream    TEXT NOT NULL,
        upstream_id TEXT NOT NULL,
        PRIMARY KEY (upstream, upstream_id),
        FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ext_ref_issue ON ext_ref(issue_id)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id   TEXT NOT NULL,
        author     TEXT NOT NULL,
        text       TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id)",
    r#"
    CREATE TABLE IF NOT EXISTS comment_map (
        comment_id          INTEGER NOT NULL,
        upstream            TEXT NOT NULL,
        upstream_comment_id TEXT NOT NULL,
        synced_at           TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        PRIMARY KEY (comment_id, upstream),
        FOREIGN KEY (comment_id) REFERENCES comments(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sync_events (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id     TEXT NOT NULL,
        direction    TEXT NOT NULL,
        upstream     TEXT NOT NULL,
        payload_hash TEXT NOT NULL,
        outcome      TEXT NOT NULL,
        error        TEXT,
        created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sync_events_issue ON sync_events(issue_id)",
    "CREATE INDEX IF NOT EXISTS idx_sync_events_hash ON sync_events(payload_hash)",
    r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    )
    "#,
    // -- Metadata table (migration bookkeeping only; not part of the public Storage API) --
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
];

/// Schema migrations applied after initial DDL.
///
/// Each migration is a `(name, sql)` pair. Migrations are tracked in the
/// `metadata` table under the key `migration:<name>` so they run at most once.
pub const MIGRATIONS: &[(&str, &str)] = &[
    // Future migrations go here, e.g.:
    // ("001_add_foo_column", "ALTER TABLE issues ADD COLUMN foo TEXT DEFAULT ''"),
];
