mod common;

use anyhow::Result;
use duckquery_runtime::{QuerySession, SessionError, Tail};
use duckquery_sql::SqlGenError;

fn close_to(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn test_mean_and_multiply() -> Result<()> {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut session = QuerySession::new(common::measurements(&values))?;
    assert!(close_to(session.mean("x")?.result(), 5.5));
    assert!(close_to(session.multiply(2.0).result(), 11.0));
    Ok(())
}

#[test]
fn test_stdev_s() -> Result<()> {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut session = QuerySession::new(common::measurements(&values))?;
    let expected = (82.5f64 / 9.0).sqrt();
    assert!(close_to(session.stdev_s("x")?.result(), expected));
    Ok(())
}

#[test]
fn test_quantile_linear_interpolation() -> Result<()> {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut session = QuerySession::new(common::measurements(&values))?;
    assert!(close_to(session.quantile("x", 0.25)?.result(), 3.25));
    assert!(close_to(session.quantile("x", 0.75)?.result(), 7.75));
    assert!(close_to(session.quantile("x", 1.0)?.result(), 10.0));
    Ok(())
}

#[test]
fn test_quantile_argument_checks() -> Result<()> {
    let mut session = QuerySession::new(common::measurements(&[1.0, 2.0]))?;
    assert!(matches!(
        session.quantile("x", 1.5),
        Err(SessionError::SqlGen(SqlGenError::InvalidArgument(_)))
    ));
    assert!(matches!(
        session.quantile("y", 0.5),
        Err(SessionError::SqlGen(SqlGenError::FieldNotFound { .. }))
    ));
    Ok(())
}

#[test]
fn test_outlier_iqr_fences() -> Result<()> {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut session = QuerySession::new(common::measurements(&values))?;
    assert!(close_to(session.outlier("x", Tail::High)?.result(), 14.5));
    assert!(close_to(session.outlier("x", Tail::Low)?.result(), -3.5));
    Ok(())
}

#[test]
fn test_outlier_switches_to_stddev_for_extreme_max() -> Result<()> {
    let values = [20.0, 22.0, 25.0, 30.0, 1000.0];
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();

    let mut session = QuerySession::new(common::measurements(&values))?;
    let high = session.outlier("x", Tail::High)?.result();
    assert!((high - (mean + 3.0 * std)).abs() < 1e-6);
    let low = session.outlier("x", Tail::Low)?.result();
    assert!((low - (mean - 3.0 * std)).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_median_of_means() -> Result<()> {
    let table = common::grouped(&[("a", 1.0), ("a", 3.0), ("b", 10.0), ("c", 4.0), ("c", 6.0)]);
    let mut session = QuerySession::new(table)?;
    assert!(close_to(session.median_of_means("g", "x")?.result(), 5.0));
    Ok(())
}

#[test]
fn test_null_aggregate_is_nan() -> Result<()> {
    let mut session = QuerySession::new(common::measurements(&[1.0, 2.0, 3.0]))?;
    session.filter("x > 100")?;
    assert_eq!(session.data().num_rows(), 0);
    assert!(session.mean("x")?.result().is_nan());
    Ok(())
}
