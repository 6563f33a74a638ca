//! Execution engine seam.
//!
//! The session only needs to register tables, run a statement and get a
//! table back. [`DuckDbEngine`] does this over an embedded DuckDB connection.

use crate::error::{Result, SessionError};
use crate::table::Table;
use duckdb::arrow::datatypes::{DataType, TimeUnit};
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::Connection;
use duckquery_common::config::EngineSettings;
use duckquery_common::scrubber::loggable;
use duckquery_sql::quote;
use std::collections::HashSet;

pub trait ExecutionEngine {
    /// Creates or replaces table `name` with the contents of `table`.
    fn register(&mut self, name: &str, table: &Table) -> Result<()>;

    /// Runs one statement and returns its full result.
    fn execute(&mut self, sql: &str) -> Result<Table>;

    /// Runs a query and stores its result as table `name` without the rows
    /// leaving the engine, then returns the stored rows.
    ///
    /// Duplicate output names are stored with `_1`, `_2`, ... suffixes; the
    /// returned table carries the query's own output names.
    fn materialize(&mut self, name: &str, sql: &str) -> Result<Table>;

    /// Releases the connection. Calling it again does nothing.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

pub struct DuckDbEngine {
    conn: Option<Connection>,
    scrub_sql: bool,
}

impl DuckDbEngine {
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        let conn = if settings.database == duckquery_common::config::DEFAULT_DATABASE {
            Connection::open_in_memory()?
        } else {
            Connection::open(&settings.database)?
        };
        if let Some(threads) = settings.threads {
            conn.execute_batch(&format!("SET threads TO {}", threads))?;
        }
        tracing::debug!(
            target: "engine",
            database = %settings.database,
            threads = ?settings.threads,
            "Opened DuckDB connection"
        );
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            scrub_sql: true,
        }
    }

    /// Whether statements are logged with their string literals masked.
    pub fn with_scrubbing(mut self, enabled: bool) -> Self {
        self.scrub_sql = enabled;
        self
    }

    fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(SessionError::ConnectionClosed)
    }
}

impl ExecutionEngine for DuckDbEngine {
    fn register(&mut self, name: &str, table: &Table) -> Result<()> {
        let conn = self.connection()?;
        let names = dedup_column_names(&table.column_names());

        let schema = table.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(&names)
            .map(|(field, column)| -> Result<String> {
                let ty = duckdb_type(field.data_type()).ok_or_else(|| {
                    SessionError::UnsupportedType {
                        column: field.name().clone(),
                        data_type: field.data_type().to_string(),
                    }
                })?;
                Ok(format!("{} {}", quote(column)?, ty))
            })
            .collect::<Result<Vec<_>>>()?;

        let ddl = format!(
            "CREATE OR REPLACE TABLE {} ({})",
            quote(name)?,
            columns.join(", ")
        );
        conn.execute_batch(&ddl)?;

        if table.num_rows() > 0 {
            let mut appender = conn.appender(name)?;
            appender.append_record_batch(table.batch().clone())?;
            appender.flush()?;
        }

        tracing::debug!(
            target: "engine",
            table = %name,
            rows = table.num_rows(),
            columns = ?names,
            "Registered table"
        );
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<Table> {
        let conn = self.connection()?;
        let logged = loggable(sql, self.scrub_sql);
        tracing::debug!(target: "engine", sql = %logged, "Executing statement");

        let run = || -> Result<Table> {
            let mut stmt = conn.prepare(sql)?;
            let arrow = stmt.query_arrow([])?;
            let schema = arrow.get_schema();
            let batches: Vec<RecordBatch> = arrow.collect();
            Table::from_batches(schema, &batches)
        };

        run().map_err(|e| {
            tracing::warn!(target: "engine", sql = %logged, error = %e, "Statement failed");
            e.with_statement(logged.to_string())
        })
    }

    fn materialize(&mut self, name: &str, sql: &str) -> Result<Table> {
        let conn = self.connection()?;
        let logged = loggable(sql, self.scrub_sql);

        let stored = || -> Result<Vec<String>> {
            let output_names = describe_columns(conn, sql)?;
            let engine_names = dedup_column_names(&output_names);
            let ddl = if engine_names == output_names {
                format!("CREATE OR REPLACE TABLE {} AS {}", quote(name)?, sql)
            } else {
                let aliases = engine_names
                    .iter()
                    .map(|c| quote(c))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                format!(
                    "CREATE OR REPLACE TABLE {} AS SELECT * FROM ({}) AS \"src\"({})",
                    quote(name)?,
                    sql,
                    aliases.join(", ")
                )
            };
            conn.execute_batch(&ddl)?;
            Ok(output_names)
        };

        let output_names = stored().map_err(|e| {
            tracing::warn!(target: "engine", table = %name, sql = %logged, error = %e, "Materialization failed");
            e.with_statement(logged.to_string())
        })?;
        tracing::debug!(target: "engine", table = %name, sql = %logged, "Materialized query");

        let table = self.execute(&format!("SELECT * FROM {}", quote(name)?))?;
        table.with_column_names(&output_names)
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => tracing::debug!(target: "engine", "Closed DuckDB connection"),
                Err((_, e)) => {
                    tracing::warn!(target: "engine", error = %e, "DuckDB connection did not close cleanly")
                }
            }
        }
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

impl Drop for DuckDbEngine {
    fn drop(&mut self) {
        self.close();
    }
}

/// Output column names of `sql`, taken from DuckDB's binder without running
/// the query.
fn describe_columns(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("DESCRIBE {}", sql))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(names)
}

/// Engine-side names for a column list: repeats get `_1`, `_2`, ... skipping
/// any name already taken.
pub fn dedup_column_names(names: &[String]) -> Vec<String> {
    let taken: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        if emitted.insert(name.clone()) {
            out.push(name.clone());
            continue;
        }
        let mut n = 1;
        let candidate = loop {
            let candidate = format!("{}_{}", name, n);
            if !taken.contains(candidate.as_str()) && !emitted.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        emitted.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// DuckDB column type for an Arrow type, if the appender can load it.
pub fn duckdb_type(data_type: &DataType) -> Option<String> {
    let ty = match data_type {
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Int8 => "TINYINT".to_string(),
        DataType::Int16 => "SMALLINT".to_string(),
        DataType::Int32 => "INTEGER".to_string(),
        DataType::Int64 => "BIGINT".to_string(),
        DataType::UInt8 => "UTINYINT".to_string(),
        DataType::UInt16 => "USMALLINT".to_string(),
        DataType::UInt32 => "UINTEGER".to_string(),
        DataType::UInt64 => "UBIGINT".to_string(),
        DataType::Float32 => "FLOAT".to_string(),
        DataType::Float64 => "DOUBLE".to_string(),
        DataType::Utf8 | DataType::LargeUtf8 => "VARCHAR".to_string(),
        DataType::Binary | DataType::LargeBinary => "BLOB".to_string(),
        DataType::Date32 => "DATE".to_string(),
        DataType::Timestamp(_, Some(_)) => "TIMESTAMPTZ".to_string(),
        DataType::Timestamp(TimeUnit::Second, None) => "TIMESTAMP_S".to_string(),
        DataType::Timestamp(TimeUnit::Millisecond, None) => "TIMESTAMP_MS".to_string(),
        DataType::Timestamp(TimeUnit::Microsecond, None) => "TIMESTAMP".to_string(),
        DataType::Timestamp(TimeUnit::Nanosecond, None) => "TIMESTAMP_NS".to_string(),
        DataType::Decimal128(precision, scale) => format!("DECIMAL({}, {})", precision, scale),
        _ => return None,
    };
    Some(ty)
}
