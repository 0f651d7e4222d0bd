//! DuckDB store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value, ValueRef};
use duckdb::{params, params_from_iter, Connection};

use crate::domain::mapping::{insert_sql, join_quoted, quote_identifier, validate_identifier};
use crate::domain::result::{Error, Result};
use crate::domain::{ClientSummary, ColumnInfo, FieldValue, Row, UserClientRow, UserSummary};
use crate::ports::{CatalogStore, ReportStore, TableSink, TableSource, UserStore};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 3;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

/// One open connection to one DuckDB database file
///
/// The connection is closed when the store is dropped, so a store opened at
/// the start of an operation is released on every exit path.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) a database file
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock. Any other failure is returned immediately.
    pub fn open(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[clientops] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::store(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a database file that must already exist
    ///
    /// Used wherever a missing file means a wrong path rather than a new store.
    pub fn open_existing(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::store(format!("database not found: {}", db_path.display())));
        }
        Self::open(db_path)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off: nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)
            .map_err(|e| Error::store(format!("{}: {}", db_path.display(), e)))?;
        Ok(conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run raw SQL statements (schema setup, fixtures)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<i64> {
        validate_identifier(table)?;
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Convert a column value into a store-neutral field
    ///
    /// Conversion is exact: decimals keep every digit, temporal values keep
    /// their unit and blobs keep their bytes. A type with no exact
    /// representation is an error, never a rendering of the value.
    fn field_value(value: ValueRef<'_>) -> Result<FieldValue> {
        let field = match value {
            ValueRef::Null => FieldValue::Null,
            ValueRef::Boolean(b) => FieldValue::Boolean(b),
            ValueRef::TinyInt(i) => FieldValue::Integer(i as i64),
            ValueRef::SmallInt(i) => FieldValue::Integer(i as i64),
            ValueRef::Int(i) => FieldValue::Integer(i as i64),
            ValueRef::BigInt(i) => FieldValue::Integer(i),
            ValueRef::HugeInt(i) => i64::try_from(i)
                .map(FieldValue::Integer)
                .unwrap_or_else(|_| FieldValue::Decimal(i.to_string())),
            ValueRef::UHugeInt(i) => i64::try_from(i)
                .map(FieldValue::Integer)
                .unwrap_or_else(|_| FieldValue::Decimal(i.to_string())),
            ValueRef::UTinyInt(i) => FieldValue::Integer(i as i64),
            ValueRef::USmallInt(i) => FieldValue::Integer(i as i64),
            ValueRef::UInt(i) => FieldValue::Integer(i as i64),
            ValueRef::UBigInt(i) => i64::try_from(i)
                .map(FieldValue::Integer)
                .unwrap_or_else(|_| FieldValue::Decimal(i.to_string())),
            ValueRef::Float(f) => FieldValue::Real(f as f64),
            ValueRef::Double(f) => FieldValue::Real(f),
            ValueRef::Decimal(d) => FieldValue::Decimal(d.to_string()),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(|s| FieldValue::Text(s.to_string()))
                .map_err(|e| Error::store(format!("text column is not valid UTF-8: {}", e)))?,
            ValueRef::Blob(bytes) => FieldValue::Blob(bytes.to_vec()),
            ValueRef::Date32(days) => {
                let date = days
                    .checked_add(EPOCH_DAYS_FROM_CE)
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .ok_or_else(|| Error::store(format!("date out of range: {} days", days)))?;
                FieldValue::Text(date.to_string())
            }
            ValueRef::Timestamp(unit, ticks) => {
                let (secs, nanos) = split_ticks(unit, ticks);
                let ts = DateTime::from_timestamp(secs, nanos).ok_or_else(|| {
                    Error::store(format!("timestamp out of range: {} {:?}", ticks, unit))
                })?;
                FieldValue::Text(ts.naive_utc().to_string())
            }
            ValueRef::Time64(unit, ticks) => {
                let (secs, nanos) = split_ticks(unit, ticks);
                let time = u32::try_from(secs)
                    .ok()
                    .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
                    .ok_or_else(|| {
                        Error::store(format!("time out of range: {} {:?}", ticks, unit))
                    })?;
                FieldValue::Text(time.to_string())
            }
            other => {
                return Err(Error::store(format!(
                    "unsupported column type {:?}",
                    other.data_type()
                )))
            }
        };
        Ok(field)
    }

    /// Convert a field into a bindable DuckDB value
    ///
    /// Decimals and temporal text are bound as strings; the target column's
    /// type decides the cast.
    fn sql_value(value: &FieldValue) -> Value {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Boolean(*b),
            FieldValue::Integer(i) => Value::BigInt(*i),
            FieldValue::Real(f) => Value::Double(*f),
            FieldValue::Text(s) | FieldValue::Decimal(s) => Value::Text(s.clone()),
            FieldValue::Blob(bytes) => Value::Blob(bytes.clone()),
        }
    }
}

/// 1970-01-01 counted in days from 0001-01-01 (day 1)
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Split a tick count in `unit` into whole seconds and sub-second nanos
fn split_ticks(unit: TimeUnit, ticks: i64) -> (i64, u32) {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let nanos_per_tick = 1_000_000_000 / per_second;
    let secs = ticks.div_euclid(per_second);
    let nanos = (ticks.rem_euclid(per_second) * nanos_per_tick) as u32;
    (secs, nanos)
}

impl UserStore for DuckDbStore {
    fn find_password_hash(&self, username: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT password FROM users WHERE username = ? LIMIT 1")?;
        let mut rows = stmt.query(params![username])?;

        match rows.next()? {
            // NULL or non-text reads as an empty hash, which never verifies
            Some(row) => {
                let hash = match Self::field_value(row.get_ref(0)?)? {
                    FieldValue::Text(s) => s,
                    FieldValue::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    _ => String::new(),
                };
                Ok(Some(hash))
            }
            None => Ok(None),
        }
    }

    fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET password = ? WHERE username = ?",
            params![password_hash, username],
        )?;
        Ok(updated)
    }
}

impl TableSource for DuckDbStore {
    fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables
             WHERE table_catalog = current_database()
               AND table_schema = 'main'
               AND table_type = 'BASE TABLE'
               AND table_name = ?",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn read_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Row>> {
        validate_identifier(table)?;
        for column in columns {
            validate_identifier(column)?;
        }

        let sql = format!("SELECT {} FROM {}", join_quoted(columns), quote_identifier(table));
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut result_rows = stmt.query([])?;

        let mut rows = Vec::new();
        while let Some(row) = result_rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let value = Self::field_value(row.get_ref(i)?)
                    .map_err(|e| Error::store(format!("{}.{}: {}", table, column, e)))?;
                values.push(value);
            }
            rows.push(values);
        }

        Ok(rows)
    }
}

impl TableSink for DuckDbStore {
    fn insert_rows(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<usize> {
        validate_identifier(table)?;
        for column in columns {
            validate_identifier(column)?;
        }

        let mut conn = self.conn()?;
        // Dropping the transaction without commit rolls it back
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql(table, columns))?;
            for (index, row) in rows.iter().enumerate() {
                if row.len() != columns.len() {
                    return Err(Error::migration(
                        index,
                        Error::configuration(format!(
                            "row has {} value(s) for {} column(s)",
                            row.len(),
                            columns.len()
                        )),
                    ));
                }
                let values: Vec<Value> = row.iter().map(Self::sql_value).collect();
                stmt.execute(params_from_iter(values.iter()))
                    .map_err(|e| Error::migration(index, e.into()))?;
            }
        }
        tx.commit()?;

        Ok(rows.len())
    }
}

impl CatalogStore for DuckDbStore {
    fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT table_name FROM information_schema.tables
             WHERE table_catalog = current_database()
               AND table_schema = 'main'
               AND table_type = 'BASE TABLE'
             ORDER BY table_name",
        )?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT ordinal_position, column_name, data_type, is_nullable, column_default
             FROM information_schema.columns
             WHERE table_catalog = current_database()
               AND table_schema = 'main'
               AND table_name = ?
             ORDER BY ordinal_position",
        )?;

        let columns = stmt
            .query_map([table], |row| {
                let nullable: String = row.get(3)?;
                Ok(ColumnInfo {
                    position: row.get(0)?,
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    nullable: nullable.eq_ignore_ascii_case("YES"),
                    default: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

impl ReportStore for DuckDbStore {
    fn users_with_clients(&self) -> Result<Vec<UserClientRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.fullname, u.email,
                    c.id, c.name, c.email, CAST(c.phone AS VARCHAR)
             FROM users u
             LEFT JOIN clients c ON u.id = c.user_id
             ORDER BY u.id, c.id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let client_id: Option<i64> = row.get(4)?;
                Ok(UserClientRow {
                    user: UserSummary {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        fullname: row.get(2)?,
                        email: row.get(3)?,
                    },
                    client: match client_id {
                        Some(id) => Some(ClientSummary {
                            id,
                            name: row.get(5)?,
                            email: row.get(6)?,
                            phone: row.get(7)?,
                        }),
                        None => None,
                    },
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
