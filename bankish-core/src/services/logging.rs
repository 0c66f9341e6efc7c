//! Client event log, kept in `logs.duckdb` inside the Bankish directory
//!
//! Events are a closed set ([`ClientEvent`]); each belongs to an area of
//! the client and may carry a subject (command name, transfer type, fee
//! source) and error text. Balances, account numbers, tokens and
//! confirmation codes are never written.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use duckdb::{params, Connection};
use serde::Serialize;

use crate::log_migrations::{BOOKKEEPING, LOG_MIGRATIONS};

const LOG_FILE: &str = "logs.duckdb";

/// Everything the client records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEvent {
    CommandRun,
    TransferOpened,
    TransferStarted,
    TransferSucceeded,
    TransferFailed,
    CodeRejected,
    BalanceCorrected,
    TransactionPosted,
    AccountsUnavailable,
    ProfileUnavailable,
    RatesUnavailable,
    FeeUnavailable,
    CodeUnavailable,
}

impl ClientEvent {
    pub const ALL: [ClientEvent; 13] = [
        ClientEvent::CommandRun,
        ClientEvent::TransferOpened,
        ClientEvent::TransferStarted,
        ClientEvent::TransferSucceeded,
        ClientEvent::TransferFailed,
        ClientEvent::CodeRejected,
        ClientEvent::BalanceCorrected,
        ClientEvent::TransactionPosted,
        ClientEvent::AccountsUnavailable,
        ClientEvent::ProfileUnavailable,
        ClientEvent::RatesUnavailable,
        ClientEvent::FeeUnavailable,
        ClientEvent::CodeUnavailable,
    ];

    /// Stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientEvent::CommandRun => "command_run",
            ClientEvent::TransferOpened => "transfer_opened",
            ClientEvent::TransferStarted => "transfer_started",
            ClientEvent::TransferSucceeded => "transfer_succeeded",
            ClientEvent::TransferFailed => "transfer_failed",
            ClientEvent::CodeRejected => "confirmation_code_rejected",
            ClientEvent::BalanceCorrected => "admin_balance_updated",
            ClientEvent::TransactionPosted => "admin_transaction_added",
            ClientEvent::AccountsUnavailable => "accounts_fetch_failed",
            ClientEvent::ProfileUnavailable => "profile_fetch_failed",
            ClientEvent::RatesUnavailable => "rates_fetch_failed",
            ClientEvent::FeeUnavailable => "fee_estimate_failed",
            ClientEvent::CodeUnavailable => "confirmation_code_fetch_failed",
        }
    }

    /// Part of the client the event comes from
    pub fn area(&self) -> &'static str {
        match self {
            ClientEvent::CommandRun => "cli",
            ClientEvent::TransferOpened
            | ClientEvent::TransferStarted
            | ClientEvent::TransferSucceeded
            | ClientEvent::TransferFailed
            | ClientEvent::CodeRejected
            | ClientEvent::FeeUnavailable
            | ClientEvent::CodeUnavailable => "transfer",
            ClientEvent::BalanceCorrected | ClientEvent::TransactionPosted => "admin",
            ClientEvent::AccountsUnavailable => "accounts",
            ClientEvent::ProfileUnavailable => "session",
            ClientEvent::RatesUnavailable => "dashboard",
        }
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        match ClientEvent::ALL.iter().find(|e| e.as_str() == name) {
            Some(event) => Ok(*event),
            None => bail!("unknown event '{}'", s.trim()),
        }
    }
}

/// One event about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub event: ClientEvent,
    pub subject: Option<String>,
    pub error: Option<String>,
}

impl LogEvent {
    pub fn new(event: ClientEvent) -> Self {
        Self { event, subject: None, error: None }
    }

    /// What the event is about: a command, a transfer type, a fee source
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn failed_with(mut self, error: impl fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Write an event if there is a log; a broken log never breaks the caller
pub(crate) fn note(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(logger) = logger {
        let _ = logger.log(event);
    }
}

/// Front end that produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    /// Embedded in another program through the library API
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    /// Unix ms
    pub recorded_at: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub area: String,
    pub subject: Option<String>,
    pub error: Option<String>,
}

/// Which entries to read back, newest first
#[derive(Debug, Clone, Copy)]
pub struct LogQuery {
    pub limit: usize,
    pub failures_only: bool,
    pub event: Option<ClientEvent>,
}

impl LogQuery {
    pub fn recent(limit: usize) -> Self {
        Self { limit, failures_only: false, event: None }
    }

    pub fn failures(limit: usize) -> Self {
        Self { failures_only: true, ..Self::recent(limit) }
    }

    pub fn of(mut self, event: ClientEvent) -> Self {
        self.event = Some(event);
        self
    }
}

/// Totals over the whole log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: u64,
    pub failures: u64,
    pub oldest: Option<i64>,
    /// Event name and count, most frequent first
    pub by_event: Vec<(String, u64)>,
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Open (or create) the log and bring its schema up to date
    pub fn new(bankish_dir: &Path, entry_point: EntryPoint, app_version: impl Into<String>) -> Result<Self> {
        let db_path = bankish_dir.join(LOG_FILE);
        let conn = Connection::open(&db_path)?;
        apply_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("event log lock poisoned: {}", e))
    }

    pub fn log(&self, event: LogEvent) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO client_events \
             (recorded_at, entry_point, app_version, platform, event, area, subject, error) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                Utc::now().timestamp_millis(),
                self.entry_point.as_str(),
                &self.app_version,
                std::env::consts::OS,
                event.event.as_str(),
                event.event.area(),
                &event.subject,
                &event.error,
            ],
        )?;
        Ok(())
    }

    pub fn entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let event = query.event.map(|e| e.as_str());
        let mut stmt = conn.prepare(
            "SELECT id, recorded_at, entry_point, app_version, platform, event, area, subject, error \
             FROM client_events \
             WHERE (NOT ? OR error IS NOT NULL) AND (? IS NULL OR event = ?) \
             ORDER BY id DESC \
             LIMIT ?",
        )?;

        let rows = stmt.query_map(params![query.failures_only, event, event, query.limit as i64], |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                recorded_at: row.get(1)?,
                entry_point: row.get(2)?,
                app_version: row.get(3)?,
                platform: row.get(4)?,
                event: row.get(5)?,
                area: row.get(6)?,
                subject: row.get(7)?,
                error: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<duckdb::Result<Vec<_>>>()?)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.conn()?;
        let (total, failures, oldest): (i64, i64, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), COUNT(error), MIN(recorded_at) FROM client_events",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT event, COUNT(*) AS n FROM client_events GROUP BY event ORDER BY n DESC, event",
        )?;
        let by_event = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(LogStats {
            total: total as u64,
            failures: failures as u64,
            oldest,
            by_event,
        })
    }

    /// Drop events recorded before `cutoff_ms`; returns how many went
    pub fn prune_before(&self, cutoff_ms: i64) -> Result<u64> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM client_events WHERE recorded_at < ?", [cutoff_ms])?;
        Ok(deleted as u64)
    }

    /// Copy the log database to `output_path`, e.g. for a support request
    pub fn export(&self, output_path: &Path) -> Result<PathBuf> {
        let conn = self.conn()?;
        conn.execute_batch("CHECKPOINT")?;
        std::fs::copy(&self.db_path, output_path)?;
        Ok(output_path.to_path_buf())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn apply_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(BOOKKEEPING)?;
    for (name, sql) in LOG_MIGRATIONS {
        let applied: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_migrations WHERE migration_name = ?",
            [name],
            |row| row.get(0),
        )?;
        if applied == 0 {
            conn.execute_batch(sql)?;
            conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
        }
    }
    Ok(())
}
