//! Type coercion of the text columns produced by the fixture.

use crate::utils::{is_numeric_dtype, parse_integer_string, parse_numeric_string};
use anyhow::{Result, bail};
use polars::prelude::*;

/// Outcome of coercing one column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Coercion {
    pub series: Series,
    /// Non-null inputs that could not be parsed and became null.
    pub failures: usize,
}

/// Convert a series to Float64 or Int64.
///
/// Text is parsed strictly: surrounding whitespace is ignored, anything else
/// that is not a finite number becomes null. Numeric input is only cast.
pub(crate) fn to_numeric(series: &Series, target_dtype: &DataType) -> Result<Coercion> {
    if is_numeric_dtype(series.dtype()) {
        let nulls_before = series.null_count();
        let cast = series.cast(target_dtype)?;
        let failures = cast.null_count().saturating_sub(nulls_before);
        return Ok(Coercion {
            series: cast,
            failures,
        });
    }

    let str_series = series.cast(&DataType::String)?;
    let str_series = str_series.str()?;
    let mut failures = 0;

    let series = match target_dtype {
        DataType::Float64 => {
            let values: Vec<Option<f64>> = str_series
                .into_iter()
                .map(|opt_val| {
                    opt_val.and_then(|val| {
                        let parsed = parse_numeric_string(val);
                        if parsed.is_none() {
                            failures += 1;
                        }
                        parsed
                    })
                })
                .collect();
            Series::new(series.name().clone(), values)
        }
        DataType::Int64 => {
            let values: Vec<Option<i64>> = str_series
                .into_iter()
                .map(|opt_val| {
                    opt_val.and_then(|val| {
                        let parsed = parse_integer_string(val);
                        if parsed.is_none() {
                            failures += 1;
                        }
                        parsed
                    })
                })
                .collect();
            Series::new(series.name().clone(), values)
        }
        other => bail!("unsupported coercion target {:?} for '{}'", other, series.name()),
    };

    Ok(Coercion { series, failures })
}

/// Coerce `column` of `df` in place, returning the number of failed values.
pub(crate) fn coerce_column(df: &mut DataFrame, column: &str, target_dtype: &DataType) -> Result<usize> {
    let coercion = to_numeric(df.column(column)?.as_materialized_series(), target_dtype)?;
    df.replace(column, coercion.series)?;
    Ok(coercion.failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_float() {
        let series = Series::new("price".into(), &["5999.9", " 850.0 ", "invalid_value", ""]);
        let result = to_numeric(&series, &DataType::Float64).unwrap();

        assert_eq!(result.series.dtype(), &DataType::Float64);
        assert_eq!(result.failures, 2);
        let values: Vec<Option<f64>> = result.series.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(5999.9), Some(850.0), None, None]);
    }

    #[test]
    fn test_text_to_integer() {
        let series = Series::new("customer".into(), &["123.0", "nan", "140", "12.5"]);
        let result = to_numeric(&series, &DataType::Int64).unwrap();

        assert_eq!(result.series.dtype(), &DataType::Int64);
        assert_eq!(result.failures, 2);
        let values: Vec<Option<i64>> = result.series.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(123), None, Some(140), None]);
    }

    #[test]
    fn test_existing_nulls_are_not_failures() {
        let series = Series::new("price".into(), &[Some("1.5"), None]);
        let result = to_numeric(&series, &DataType::Float64).unwrap();
        assert_eq!(result.failures, 0);
        assert_eq!(result.series.null_count(), 1);
    }

    #[test]
    fn test_numeric_input_is_only_cast() {
        let series = Series::new("customer".into(), &[Some(101.0), None]);
        let result = to_numeric(&series, &DataType::Int64).unwrap();
        assert_eq!(result.series.dtype(), &DataType::Int64);
        assert_eq!(result.failures, 0);
    }

    #[test]
    fn test_unsupported_target() {
        let series = Series::new("x".into(), &["1"]);
        assert!(to_numeric(&series, &DataType::Boolean).is_err());
    }

    #[test]
    fn test_coerce_column_in_place() {
        let mut df = df!["price" => ["1.0", "oops"]].unwrap();
        let failures = coerce_column(&mut df, "price", &DataType::Float64).unwrap();
        assert_eq!(failures, 1);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
    }
}
