//! Tabular values moved between the caller and the engine.

use crate::error::{Result, SessionError};
use duckdb::arrow::compute::concat_batches;
use duckdb::arrow::datatypes::{Field, Schema, SchemaRef};
use duckdb::arrow::record_batch::RecordBatch;
use duckquery_sql::SqlGenError;
use std::sync::Arc;

/// An in-memory table backed by one Arrow [`RecordBatch`].
///
/// Column names may repeat.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn empty(schema: SchemaRef) -> Self {
        Self::new(RecordBatch::new_empty(schema))
    }

    /// Concatenates `batches` into a single table with `schema`.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        if batches.is_empty() {
            return Ok(Self::empty(schema));
        }
        Ok(Self::new(concat_batches(&schema, batches)?))
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Rows `offset..offset + len`, clamped to the table.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        let offset = offset.min(self.num_rows());
        let len = len.min(self.num_rows() - offset);
        Self::new(self.batch.slice(offset, len))
    }

    /// Same data under new column names.
    pub fn with_column_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        if names.len() != self.num_columns() {
            return Err(SqlGenError::InvalidArgument(format!(
                "expected {} column names, got {}",
                self.num_columns(),
                names.len()
            ))
            .into());
        }
        let schema = self.batch.schema();
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .zip(names)
            .map(|(field, name)| field.as_ref().clone().with_name(name.as_ref()))
            .collect();
        let renamed = Schema::new_with_metadata(fields, schema.metadata().clone());
        RecordBatch::try_new(Arc::new(renamed), self.batch.columns().to_vec())
            .map(Self::new)
            .map_err(SessionError::from)
    }
}

impl From<RecordBatch> for Table {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}
