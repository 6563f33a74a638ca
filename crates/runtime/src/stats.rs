//! Scalar statistics over the working table.
//!
//! Each call stores its result in the session's value slot, read back with
//! [`QuerySession::result`]. A NULL aggregate stores `NaN`.

use crate::engine::ExecutionEngine;
use crate::error::{Result, SessionError};
use crate::session::QuerySession;
use crate::table::Table;
use duckdb::arrow::array::{Array, Float64Array};
use duckdb::arrow::compute::cast;
use duckdb::arrow::datatypes::DataType;
use duckquery_sql::{aggregate_fn, from_clause, quote, SqlGenError};

/// Which fence [`QuerySession::outlier`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    High,
    Low,
}

/// Above this column maximum the outlier fence switches from IQR to
/// mean ± 3 standard deviations.
const EXTREME_MAX: f64 = 1000.0;

impl<E: ExecutionEngine> QuerySession<E> {
    pub fn result(&self) -> f64 {
        self.value
    }

    pub fn multiply(&mut self, factor: f64) -> &mut Self {
        self.value *= factor;
        self
    }

    pub fn mean(&mut self, column: &str) -> Result<&mut Self> {
        self.value = self.aggregate_scalar(&aggregate_fn("AVG", column)?)?;
        Ok(self)
    }

    /// Sample standard deviation.
    pub fn stdev_s(&mut self, column: &str) -> Result<&mut Self> {
        self.value = self.aggregate_scalar(&format!("stddev_samp({})", quote(column)?))?;
        Ok(self)
    }

    /// Median of the per-group means of `mean_column`.
    pub fn median_of_means(&mut self, group_column: &str, mean_column: &str) -> Result<&mut Self> {
        let group = quote(group_column)?;
        let sql = format!(
            "SELECT median(means.value) FROM (SELECT {}, AVG({}) AS value {} GROUP BY {}) AS means",
            group,
            quote(mean_column)?,
            from_clause(self.working_alias())?,
            group
        );
        self.value = self.scalar(&sql)?;
        Ok(self)
    }

    /// Continuous quantile with linear interpolation, `p` in `[0, 1]`.
    pub fn quantile(&mut self, column: &str, p: f64) -> Result<&mut Self> {
        self.value = self.quantile_value(column, p)?;
        Ok(self)
    }

    /// Fence beyond which values of `column` count as outliers.
    ///
    /// Uses `q3 + 1.5 * iqr` / `q1 - 1.5 * iqr`, or `mean ± 3 * stddev` when
    /// the column maximum reaches 1000.
    pub fn outlier(&mut self, column: &str, tail: Tail) -> Result<&mut Self> {
        let q1 = self.quantile_value(column, 0.25)?;
        let q3 = self.quantile_value(column, 0.75)?;
        let iqr = q3 - q1;
        let max = self.aggregate_scalar(&aggregate_fn("MAX", column)?)?;

        self.value = if max >= EXTREME_MAX {
            let mean = self.aggregate_scalar(&aggregate_fn("AVG", column)?)?;
            let std = self.aggregate_scalar(&format!("stddev_samp({})", quote(column)?))?;
            match tail {
                Tail::High => mean + 3.0 * std,
                Tail::Low => mean - 3.0 * std,
            }
        } else {
            match tail {
                Tail::High => q3 + 1.5 * iqr,
                Tail::Low => q1 - 1.5 * iqr,
            }
        };
        tracing::debug!(
            target: "session",
            column = %column,
            ?tail,
            fence = self.value,
            "Computed outlier fence"
        );
        Ok(self)
    }

    fn quantile_value(&mut self, column: &str, p: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&p) {
            return Err(SqlGenError::InvalidArgument(format!(
                "quantile must be between 0 and 1, got {}",
                p
            ))
            .into());
        }
        self.require_column(column)?;
        self.aggregate_scalar(&format!("quantile_cont({}, {})", quote(column)?, p))
    }

    fn require_column(&self, column: &str) -> Result<()> {
        let available = self.data().column_names();
        if available.iter().any(|c| c == column) {
            return Ok(());
        }
        Err(SqlGenError::FieldNotFound {
            column: column.to_string(),
            relation: self.working_alias().to_string(),
            available,
        }
        .into())
    }

    fn aggregate_scalar(&mut self, expr: &str) -> Result<f64> {
        let sql = format!("SELECT {} {}", expr, from_clause(self.working_alias())?);
        self.scalar(&sql)
    }

    fn scalar(&mut self, sql: &str) -> Result<f64> {
        let table = self.execute(sql)?;
        first_value(&table)
    }
}

/// First cell of `table` as `f64`; NULL or no rows give `NaN`.
fn first_value(table: &Table) -> Result<f64> {
    if table.num_rows() == 0 || table.num_columns() == 0 {
        return Ok(f64::NAN);
    }
    let column = cast(table.batch().column(0), &DataType::Float64)?;
    let values = column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| SessionError::Arrow("expected a Float64 column".into()))?;
    if values.is_null(0) {
        Ok(f64::NAN)
    } else {
        Ok(values.value(0))
    }
}
