//! The stateful query builder.

use crate::engine::{DuckDbEngine, ExecutionEngine};
use crate::error::{Result, SessionError};
use crate::table::Table;
use duckquery_common::config::{AmbiguityPolicy, SessionConfig};
use duckquery_sql::sql_generator::sanitize::quote_relation;
use duckquery_sql::transform::TableRef;
use duckquery_sql::{
    buffer_table_name, from_clause, normalize_column_names, quote, JoinContext, NodeId,
    QueryAssembler, SqlGenError, StepGenerator, StructuredQuery, TransformArena, TransformNode,
};
use std::collections::HashMap;

/// A working table plus auxiliary tables, all registered with one engine.
///
/// Every transforming call runs one statement against the working table
/// (registered under the working alias, `current_df` by default) and makes the
/// result the new working table.
///
/// A session is meant for one thread. Calls take `&mut self`; the DuckDB
/// connection inside is not `Sync`, so sharing one across threads needs
/// outside locking.
pub struct QuerySession<E: ExecutionEngine = DuckDbEngine> {
    engine: E,
    working: Table,
    tables: Vec<(String, Table)>,
    working_alias: String,
    policy: AmbiguityPolicy,
    pub(crate) value: f64,
}

impl QuerySession<DuckDbEngine> {
    /// In-memory DuckDB with default settings.
    pub fn new(table: Table) -> Result<Self> {
        Self::with_config(table, &SessionConfig::in_memory())
    }

    /// Loads settings with [`SessionConfig::from_file`] and opens a session.
    pub fn from_config_file(table: Table, path: &str) -> Result<Self> {
        let config = SessionConfig::from_file(path).map_err(|e| SessionError::Config {
            path: path.to_string(),
            message: format!("{:#}", e),
        })?;
        Self::with_config(table, &config)
    }

    pub fn with_config(table: Table, config: &SessionConfig) -> Result<Self> {
        let engine =
            DuckDbEngine::from_settings(&config.engine)?.with_scrubbing(config.logging.scrub_sql);
        Self::with_engine(engine, table, config)
    }
}

impl<E: ExecutionEngine> QuerySession<E> {
    pub fn with_engine(mut engine: E, table: Table, config: &SessionConfig) -> Result<Self> {
        let working_alias = config.session.working_alias.clone();
        engine.register(&working_alias, &table)?;
        Ok(Self {
            engine,
            working: table,
            tables: Vec::new(),
            working_alias,
            policy: config.session.ambiguity_policy,
            value: f64::NAN,
        })
    }

    pub fn data(&self) -> &Table {
        &self.working
    }

    pub fn working_alias(&self) -> &str {
        &self.working_alias
    }

    pub fn registered_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Registered tables in registration order.
    pub fn registered_tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_open()
    }

    /// Relations visible to the next query.
    pub fn join_context(&self) -> JoinContext {
        let mut ctx = JoinContext::new(self.working_alias.clone(), self.working.column_names())
            .with_policy(self.policy);
        for (name, table) in &self.tables {
            ctx.register(name.clone(), table.column_names());
        }
        ctx
    }

    pub fn filter(&mut self, condition: &str) -> Result<&mut Self> {
        if condition.trim().is_empty() {
            return Err(SqlGenError::InvalidArgument("filter condition cannot be empty".into()).into());
        }
        self.apply_query(&StructuredQuery::new().filter(condition))
    }

    /// Projects the working table onto `columns`; an empty list keeps every
    /// column.
    pub fn select<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<&mut Self> {
        let quoted = columns
            .iter()
            .map(|c| quote(c.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.apply_query(&StructuredQuery::new().select(quoted))
    }

    /// `orderings` are (column, direction) pairs.
    pub fn order<C: AsRef<str>, D: AsRef<str>>(
        &mut self,
        orderings: &[(C, D)],
    ) -> Result<&mut Self> {
        let mut query = StructuredQuery::new();
        for (column, direction) in orderings {
            query = query.order_by(quote(column.as_ref())?, direction.as_ref());
        }
        self.apply_query(&query)
    }

    /// Keeps the first `n` rows; `n <= 0` keeps everything.
    pub fn limit(&mut self, n: i64) -> Result<&mut Self> {
        self.apply_query(&StructuredQuery::new().limit(n))
    }

    /// Registers an auxiliary table for joins. Registering a name again
    /// replaces the table and keeps its place in the registration order.
    pub fn register_table(&mut self, name: &str, table: Table) -> Result<&mut Self> {
        quote_relation(name)?;
        if name == self.working_alias {
            return Err(SqlGenError::InvalidArgument(format!(
                "'{}' is reserved for the working table",
                name
            ))
            .into());
        }
        self.ensure_open()?;
        self.engine.register(name, &table)?;
        match self.tables.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = table,
            None => self.tables.push((name.to_string(), table)),
        }
        tracing::debug!(target: "session", table = %name, "Registered auxiliary table");
        Ok(self)
    }

    /// SQL `run_query` would execute for `query`.
    pub fn sql_for(&self, query: &StructuredQuery) -> Result<String> {
        let ctx = self.join_context();
        Ok(QueryAssembler::new(&ctx).assemble(query)?)
    }

    /// Runs a structured query and restores duplicated column names in the
    /// result.
    pub fn run_query(&mut self, query: &StructuredQuery) -> Result<&mut Self> {
        let sql = self.sql_for(query)?;
        self.ensure_open()?;
        let result = self.engine.materialize(&self.working_alias, &sql)?;
        let names = normalize_column_names(&result.column_names());
        self.working = result.with_column_names(&names)?;
        Ok(self)
    }

    /// Runs one transform step. Buffer steps under it are materialized first.
    pub fn run_step(&mut self, arena: &TransformArena, id: NodeId) -> Result<&mut Self> {
        self.ensure_open()?;
        let ctx = self.join_context();
        let mut materialized: HashMap<NodeId, String> = HashMap::new();

        for buffer in arena.buffers_under(id)? {
            let TransformNode::Buffer(node) = arena.get(buffer)? else {
                continue;
            };
            let source_sql = {
                let generator = materialized.iter().fold(
                    StepGenerator::new(arena, &ctx),
                    |gen, (done, table)| gen.with_materialized(*done, table.clone()),
                );
                match &node.source {
                    TableRef::Named(name) => format!("SELECT * {}", from_clause(name)?),
                    TableRef::Derived(source) => generator.generate(*source)?,
                }
            };
            let name = buffer_table_name(buffer);
            self.engine.materialize(&name, &source_sql)?;
            tracing::debug!(target: "session", step = %buffer, table = %name, "Materialized buffer");
            materialized.insert(buffer, name);
        }

        let sql = QueryAssembler::new(&ctx).assemble_step(arena, id, &materialized)?;
        self.apply(&sql)
    }

    /// Logs the working table's shape and columns.
    pub fn show_info(&mut self) -> &mut Self {
        tracing::info!(
            target: "session",
            rows = self.working.num_rows(),
            columns = self.working.num_columns(),
            names = ?self.working.column_names(),
            "Working table"
        );
        self
    }

    /// Releases the engine. Safe to call more than once.
    pub fn close(&mut self) {
        if self.engine.is_open() {
            self.engine.close();
            tracing::debug!(target: "session", "Session closed");
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.engine.is_open() {
            Ok(())
        } else {
            Err(SessionError::ConnectionClosed)
        }
    }

    fn apply_query(&mut self, query: &StructuredQuery) -> Result<&mut Self> {
        let sql = self.sql_for(query)?;
        self.apply(&sql)
    }

    /// Runs `sql` and makes its result the working table. The result is
    /// stored under the working alias inside the engine.
    pub(crate) fn apply(&mut self, sql: &str) -> Result<&mut Self> {
        self.ensure_open()?;
        self.working = self.engine.materialize(&self.working_alias, sql)?;
        Ok(self)
    }

    pub(crate) fn execute(&mut self, sql: &str) -> Result<Table> {
        self.ensure_open()?;
        self.engine.execute(sql)
    }

}

impl<E: ExecutionEngine> Drop for QuerySession<E> {
    fn drop(&mut self) {
        self.close();
    }
}

