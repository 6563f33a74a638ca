//! Query execution for duckquery.
//!
//! [`QuerySession`] keeps a working table and auxiliary tables registered with
//! an [`ExecutionEngine`], runs the SQL `duckquery-sql` produces and folds each
//! result back into the working table.
//!
//! ```no_run
//! use duckquery_runtime::{QuerySession, Table};
//! # fn demo(employees: Table) -> duckquery_runtime::Result<()> {
//! let mut session = QuerySession::new(employees)?;
//! session.filter("age >= 30")?.select(&["name", "age"])?.limit(10)?;
//! println!("{} rows", session.data().num_rows());
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod session;
pub mod stats;
pub mod table;

pub use engine::{DuckDbEngine, ExecutionEngine};
pub use error::{Result, SessionError};
pub use session::QuerySession;
pub use stats::Tail;
pub use table::Table;
