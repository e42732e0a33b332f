//! CSV ingest and validation.
//!
//! This module turns a benchmark summary CSV into a validated
//! [`MeasurementSet`] that is safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Explicit absent signal**: a missing file is `Ok(None)`, never an error,
//!   so callers decide whether absence is fatal (primary) or a warning
//!   (comparison datasets)
//! - **Deterministic behavior**: rows are sorted by `n` after parsing
//! - **Separation of concerns**: no fitting logic here

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::MeasurementSet;
use crate::error::AppError;

/// Load one summary CSV into a `MeasurementSet`.
///
/// Returns `Ok(None)` when `path` does not exist. A present-but-malformed
/// source (missing columns, short rows, non-numeric or non-positive values)
/// is an error carrying the dataset path and offending line.
pub fn load_measurement_set(
    path: &Path,
    label: &str,
    required_columns: &[String],
) -> Result<Option<MeasurementSet>, AppError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::new(
                2,
                format!("Failed to open dataset '{}': {e}", path.display()),
            ));
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| {
            AppError::new(
                2,
                format!("Failed to read CSV headers of '{}': {e}", path.display()),
            )
        })?
        .clone();

    let header_map = build_header_map(&headers);

    let n_idx = *header_map.get("n").ok_or_else(|| {
        AppError::new(
            2,
            format!("Dataset '{}': missing required column 'n'", path.display()),
        )
    })?;

    let mut column_indices = Vec::with_capacity(required_columns.len());
    for name in required_columns {
        let idx = *header_map.get(name.as_str()).ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "Dataset '{}': missing required column '{name}'",
                    path.display()
                ),
            )
        })?;
        column_indices.push((name.clone(), idx));
    }

    let mut n_values = Vec::new();
    let mut column_values: Vec<Vec<f64>> = vec![Vec::new(); column_indices.len()];

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV line numbers are 1-based.
        let line = idx + 2;

        let record = result.map_err(|e| {
            AppError::new(
                2,
                format!("Dataset '{}' line {line}: {e}", path.display()),
            )
        })?;

        n_values.push(parse_field(&record, n_idx, "n", path, line)?);
        for ((name, col_idx), values) in column_indices.iter().zip(column_values.iter_mut()) {
            values.push(parse_field(&record, *col_idx, name, path, line)?);
        }
    }

    let columns: BTreeMap<String, Vec<f64>> = column_indices
        .into_iter()
        .map(|(name, _)| name)
        .zip(column_values)
        .collect();

    let set = MeasurementSet::new(label, n_values, columns).map_err(|e| {
        AppError::new(2, format!("Dataset '{}': {e}", path.display()))
    })?;

    Ok(Some(set))
}

/// Lowercased header name → column index.
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

fn parse_field(
    record: &StringRecord,
    idx: usize,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<f64, AppError> {
    let raw = record.get(idx).ok_or_else(|| {
        AppError::new(
            2,
            format!(
                "Dataset '{}' line {line}: row too short, no value for '{name}'",
                path.display()
            ),
        )
    })?;
    raw.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!(
                "Dataset '{}' line {line}: invalid number '{raw}' in column '{name}'",
                path.display()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sortcurves_ingest_{name}_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn required() -> Vec<String> {
        vec!["avg_age_comp".to_string()]
    }

    #[test]
    fn absent_file_is_not_an_error() {
        let path = std::env::temp_dir().join("sortcurves_ingest_definitely_absent.csv");
        let loaded = load_measurement_set(&path, "merge", &required()).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn loads_and_sorts_rows() {
        let path = temp_csv("sorts", "n,avg_age_comp\n30,52\n10,12\n20,30\n");
        let set = load_measurement_set(&path, "quick", &required())
            .unwrap()
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(set.label, "quick");
        assert_eq!(set.sizes(), &[10.0, 20.0, 30.0]);
        assert_eq!(set.column("avg_age_comp").unwrap(), &[12.0, 30.0, 52.0]);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let path = temp_csv("missing_col", "n,avg_name_comp\n10,12\n");
        let err = load_measurement_set(&path, "quick", &required()).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("avg_age_comp"), "{err}");
    }

    #[test]
    fn short_row_is_fatal_with_line_number() {
        let path = temp_csv("short_row", "n,avg_age_comp\n10,12\n20\n");
        let err = load_measurement_set(&path, "quick", &required()).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn non_numeric_and_non_positive_sizes_are_fatal() {
        let path = temp_csv("bad_value", "n,avg_age_comp\nten,12\n");
        assert!(load_measurement_set(&path, "quick", &required()).is_err());
        std::fs::remove_file(&path).ok();

        let path = temp_csv("zero_n", "n,avg_age_comp\n0,12\n");
        assert!(load_measurement_set(&path, "quick", &required()).is_err());
        std::fs::remove_file(&path).ok();
    }
}
