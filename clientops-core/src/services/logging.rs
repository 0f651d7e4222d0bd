//! Operator audit log kept in logs.duckdb
//!
//! Each CLI command leaves a trail of events: what ran, against which table
//! or account, how many rows it touched and how it ended. Plaintext
//! passwords and password hashes are never recorded.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use duckdb::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

const LOG_FILE: &str = "logs.duckdb";

const LOG_SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS ops_log_seq;
CREATE TABLE IF NOT EXISTS ops_log (
    id BIGINT PRIMARY KEY DEFAULT nextval('ops_log_seq'),
    logged_at BIGINT NOT NULL,
    app_version VARCHAR NOT NULL,
    os VARCHAR NOT NULL,
    event VARCHAR NOT NULL,
    outcome VARCHAR NOT NULL,
    command VARCHAR,
    subject VARCHAR,
    rows_affected BIGINT,
    error_message VARCHAR
);
";

const ENTRY_COLUMNS: &str = "id, logged_at, app_version, os, event, outcome, \
                             command, subject, rows_affected, error_message";

/// Current unix time in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Info,
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Info => "info",
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "success" => Outcome::Success,
            "failure" => Outcome::Failure,
            _ => Outcome::Info,
        }
    }
}

/// Event about to be recorded
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub event: String,
    pub outcome: Outcome,
    pub command: Option<String>,
    /// Table name or username the event is about
    pub subject: Option<String>,
    pub rows_affected: Option<i64>,
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            outcome: Outcome::Info,
            command: None,
            subject: None,
            rows_affected: None,
            error_message: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_rows_affected(mut self, rows: usize) -> Self {
        self.rows_affected = Some(rows as i64);
        self
    }

    /// Mark the event as a completed operation
    pub fn succeeded(mut self) -> Self {
        self.outcome = Outcome::Success;
        self
    }

    /// Mark the event as failed with `message`
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Failure;
        self.error_message = Some(message.into());
        self
    }
}

/// Recorded event
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub logged_at: i64,
    pub app_version: String,
    pub os: String,
    pub event: String,
    pub outcome: Outcome,
    pub command: Option<String>,
    pub subject: Option<String>,
    pub rows_affected: Option<i64>,
    pub error_message: Option<String>,
}

impl LogEntry {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        let outcome: String = row.get(5)?;
        Ok(Self {
            id: row.get(0)?,
            logged_at: row.get(1)?,
            app_version: row.get(2)?,
            os: row.get(3)?,
            event: row.get(4)?,
            outcome: Outcome::parse(&outcome),
            command: row.get(6)?,
            subject: row.get(7)?,
            rows_affected: row.get(8)?,
            error_message: row.get(9)?,
        })
    }
}

/// Which entries a query returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFilter {
    All,
    Failures,
    Command(String),
}

/// Summary counts for `logs stats`
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total_entries: u64,
    pub failures: u64,
    pub oldest: Option<i64>,
    pub newest: Option<i64>,
}

/// Writer and reader for the audit log
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
}

impl LoggingService {
    /// Open or create the log database in the operator directory
    pub fn new(ops_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        let db_path = ops_dir.join(LOG_FILE);
        let conn = Connection::open(&db_path)?;
        conn.execute_batch(LOG_SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))
    }

    /// Record an event, stamped with time, app version and OS
    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO ops_log (logged_at, app_version, os, event, outcome,
                                  command, subject, rows_affected, error_message)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                now_ms(),
                self.app_version,
                std::env::consts::OS,
                event.event,
                event.outcome.as_str(),
                event.command,
                event.subject,
                event.rows_affected,
                event.error_message,
            ],
        )?;
        Ok(())
    }

    /// Newest entries first
    pub fn recent(&self, filter: &LogFilter, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let limit = limit as i64;

        let entries = match filter {
            LogFilter::All => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM ops_log ORDER BY id DESC LIMIT ?",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit], LogEntry::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            LogFilter::Failures => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM ops_log WHERE outcome = 'failure' ORDER BY id DESC LIMIT ?",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit], LogEntry::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            LogFilter::Command(command) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM ops_log WHERE command = ? ORDER BY id DESC LIMIT ?",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![command, limit], LogEntry::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(entries)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.conn()?;
        let (total, failures, oldest, newest): (i64, i64, Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE outcome = 'failure'),
                        MIN(logged_at),
                        MAX(logged_at)
                 FROM ops_log",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        Ok(LogStats {
            total_entries: total as u64,
            failures: failures as u64,
            oldest,
            newest,
        })
    }

    /// Drop entries logged before `cutoff_ms`
    pub fn prune_before(&self, cutoff_ms: i64) -> Result<u64> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM ops_log WHERE logged_at < ?", params![cutoff_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
