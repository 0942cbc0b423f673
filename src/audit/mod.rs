//! Audit log: SQLite-based operation history.
//!
//! Records every vault operation (add, edit, delete, rekey) in a local
//! SQLite database next to the store file.  Entries carry the owner, the
//! operation, the item id and a short detail string, never record
//! contents, passwords or ciphertext.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{Result, VaultError};

/// File name of the audit database inside the store directory.
const DB_FILE: &str = "audit.db";

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub owner: String,
    pub item_id: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened; callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(dir);
        let conn = match Connection::open(&db_path) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "audit log unavailable");
                return None;
            }
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                operation TEXT NOT NULL,
                owner     TEXT NOT NULL,
                item_id   TEXT,
                details   TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget; failures are only traced.
    pub fn log(&self, operation: &str, owner: &str, item_id: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, owner, item_id, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, owner, item_id, details],
        ) {
            tracing::warn!(error = %e, operation, "failed to write audit entry");
        }
    }

    /// Query recent audit entries for `owner`, most recent first.
    ///
    /// - `limit`: maximum number of entries to return.
    /// - `since`: if provided, only return entries at or after this time.
    pub fn query(
        &self,
        owner: &str,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        // RFC 3339 strings order chronologically; "" sorts before all of them.
        let since = since.map(|ts| ts.to_rfc3339()).unwrap_or_default();

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, owner, item_id, details
                 FROM audit_log
                 WHERE owner = ?1 AND timestamp >= ?2
                 ORDER BY id DESC
                 LIMIT ?3",
            )
            .map_err(|e| VaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![owner, since, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    owner: row.get(3)?,
                    item_id: row.get(4)?,
                    details: row.get(5)?,
                })
            })
            .map_err(|e| VaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| VaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Return the path to the audit database (for testing/display).
    pub fn db_path(dir: &Path) -> PathBuf {
        dir.join(DB_FILE)
    }
}

/// Parse a duration like `7d`, `24h` or `30m` into a cutoff time.
pub fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let unit_at = input.char_indices().last().map_or(0, |(i, _)| i);
    let (num, unit) = input.split_at(unit_at);
    let n: i64 = num
        .parse()
        .map_err(|_| VaultError::CommandFailed(format!("invalid duration '{input}'")))?;
    let delta = match unit {
        "d" => chrono::Duration::try_days(n),
        "h" => chrono::Duration::try_hours(n),
        "m" => chrono::Duration::try_minutes(n),
        _ => None,
    }
    .ok_or_else(|| {
        VaultError::CommandFailed(format!(
            "invalid duration '{input}': use a number followed by d, h or m"
        ))
    })?;
    Ok(Utc::now() - delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        assert!(AuditLog::open(dir.path()).is_some());
        assert!(dir.path().join("audit.db").exists());
    }

    #[test]
    fn log_and_query_roundtrip() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("add", "alice", Some("item-1"), None);
        audit.log("edit", "alice", Some("item-1"), Some("fresh salt"));
        audit.log("delete", "alice", Some("item-1"), None);

        let entries = audit.query("alice", 10, None).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].operation, "delete");
        assert_eq!(entries[1].details.as_deref(), Some("fresh salt"));
        assert_eq!(entries[2].operation, "add");
    }

    #[test]
    fn query_is_scoped_to_owner() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("add", "alice", Some("a"), None);
        audit.log("add", "bob", Some("b"), None);

        let entries = audit.query("bob", 10, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item_id.as_deref(), Some("b"));
    }

    #[test]
    fn query_with_limit_and_since() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        for i in 0..5 {
            audit.log("add", "alice", Some(&format!("item-{i}")), None);
        }
        assert_eq!(audit.query("alice", 2, None).unwrap().len(), 2);

        let past = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(audit.query("alice", 10, Some(past)).unwrap().len(), 5);

        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(audit.query("alice", 10, Some(future)).unwrap().is_empty());
    }

    #[test]
    fn open_returns_none_on_bad_path() {
        assert!(AuditLog::open(Path::new("/nonexistent/path/that/does/not/exist")).is_none());
    }

    #[test]
    fn parse_since_units() {
        let now = Utc::now();
        let week = parse_since("7d").unwrap();
        assert!(now - week >= chrono::Duration::days(7) - chrono::Duration::seconds(5));
        assert!(parse_since("24h").is_ok());
        assert!(parse_since("30m").is_ok());
        assert!(parse_since("7w").is_err());
        assert!(parse_since("").is_err());
        assert!(parse_since("xd").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn audit_db_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _audit = AuditLog::open(dir.path()).unwrap();

        let perms = std::fs::metadata(dir.path().join("audit.db"))
            .unwrap()
            .permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
