use duckdb::arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use duckdb::arrow::compute::cast;
use duckdb::arrow::datatypes::{DataType, Field, Schema};
use duckdb::arrow::record_batch::RecordBatch;
use duckquery_runtime::Table;
use std::sync::Arc;

#[allow(dead_code)]
pub fn employees() -> Table {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("age", DataType::Int64, false),
        Field::new("dept_id", DataType::Int64, false),
        Field::new("salary", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5])),
        Arc::new(StringArray::from(vec!["Alice", "Bob", "Carol", "Dave", "Eve"])),
        Arc::new(Int64Array::from(vec![25, 35, 45, 30, 52])),
        Arc::new(Int64Array::from(vec![1, 2, 1, 3, 4])),
        Arc::new(Float64Array::from(vec![
            50000.0, 60000.0, 70000.0, 55000.0, 80000.0,
        ])),
    ];
    table(schema, columns)
}

/// Departments 1, 2, 3 and 5; employee Eve points at the missing 4.
#[allow(dead_code)]
pub fn departments() -> Table {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("dept_name", DataType::Utf8, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2, 3, 5])),
        Arc::new(StringArray::from(vec![
            "Engineering",
            "Sales",
            "Marketing",
            "Legal",
        ])),
    ];
    table(schema, columns)
}

#[allow(dead_code)]
pub fn sales() -> Table {
    let schema = Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("quarter", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["East", "East", "West", "West", "North"])),
        Arc::new(StringArray::from(vec!["Q1", "Q2", "Q1", "Q2", "Q1"])),
        Arc::new(Float64Array::from(vec![100.0, 150.0, 200.0, 50.0, 75.0])),
    ];
    table(schema, columns)
}

#[allow(dead_code)]
pub fn quarterly() -> Table {
    let schema = Schema::new(vec![
        Field::new("store", DataType::Utf8, false),
        Field::new("q1", DataType::Float64, false),
        Field::new("q2", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["a", "b", "c"])),
        Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])),
        Arc::new(Float64Array::from(vec![4.0, 5.0, 6.0])),
    ];
    table(schema, columns)
}

/// Single float column `x`.
#[allow(dead_code)]
pub fn measurements(values: &[f64]) -> Table {
    let schema = Schema::new(vec![Field::new("x", DataType::Float64, false)]);
    table(schema, vec![Arc::new(Float64Array::from(values.to_vec()))])
}

/// Groups `g` with values `x`.
#[allow(dead_code)]
pub fn grouped(rows: &[(&str, f64)]) -> Table {
    let schema = Schema::new(vec![
        Field::new("g", DataType::Utf8, false),
        Field::new("x", DataType::Float64, false),
    ]);
    let groups: Vec<&str> = rows.iter().map(|(g, _)| *g).collect();
    let values: Vec<f64> = rows.iter().map(|(_, x)| *x).collect();
    table(
        schema,
        vec![
            Arc::new(StringArray::from(groups)),
            Arc::new(Float64Array::from(values)),
        ],
    )
}

fn table(schema: Schema, columns: Vec<ArrayRef>) -> Table {
    Table::new(RecordBatch::try_new(Arc::new(schema), columns).unwrap())
}

fn column_index(table: &Table, name: &str) -> usize {
    table
        .column_names()
        .iter()
        .position(|c| c == name)
        .unwrap_or_else(|| panic!("no column {} in {:?}", name, table.column_names()))
}

#[allow(dead_code)]
pub fn strings(table: &Table, name: &str) -> Vec<String> {
    let column = cast(table.batch().column(column_index(table, name)), &DataType::Utf8).unwrap();
    let values = column.as_any().downcast_ref::<StringArray>().unwrap();
    (0..values.len()).map(|i| values.value(i).to_string()).collect()
}

#[allow(dead_code)]
pub fn floats(table: &Table, name: &str) -> Vec<f64> {
    let column = cast(table.batch().column(column_index(table, name)), &DataType::Float64).unwrap();
    let values = column.as_any().downcast_ref::<Float64Array>().unwrap();
    (0..values.len()).map(|i| values.value(i)).collect()
}
