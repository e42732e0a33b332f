//! Export fitted coefficients to JSON.
//!
//! The export is the "portable" representation of a run's fits: one record per
//! series with the model kind, coefficients, and fit quality, plus the skip
//! reason for series that could not be fitted. Meant to be easy to consume in
//! notebooks or downstream scripts.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{GrowthKind, Quantity, SortKey};
use crate::error::AppError;
use crate::fit::SeriesFit;
use crate::models::equation;

/// Top-level export schema.
#[derive(Debug, Serialize)]
pub struct FitsFile {
    pub tool: String,
    pub series: Vec<SeriesRecord>,
}

/// One fitted (or skipped) series.
#[derive(Debug, Serialize)]
pub struct SeriesRecord {
    pub dataset: String,
    pub sort_key: SortKey,
    pub quantity: Quantity,
    pub model: GrowthKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Write every series fit to a pretty-printed JSON file.
pub fn write_fits_json(path: &Path, fits: &[SeriesFit]) -> Result<(), AppError> {
    let records: Vec<SeriesRecord> = fits
        .iter()
        .map(|f| match &f.outcome {
            Ok(fit) => SeriesRecord {
                dataset: f.dataset.clone(),
                sort_key: f.key,
                quantity: f.quantity,
                model: f.kind,
                coefficients: Some(fit.coeffs.clone()),
                equation: Some(equation(fit.kind, &fit.coeffs)),
                sse: Some(fit.sse),
                rmse: Some(fit.rmse),
                skipped: None,
            },
            Err(e) => SeriesRecord {
                dataset: f.dataset.clone(),
                sort_key: f.key,
                quantity: f.quantity,
                model: f.kind,
                coefficients: None,
                equation: None,
                sse: None,
                rmse: None,
                skipped: Some(e.to_string()),
            },
        })
        .collect();

    let out = FitsFile {
        tool: "sortcurves".to_string(),
        series: records,
    };

    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create fits JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::new(2, format!("Failed to write fits JSON: {e}")))?;

    Ok(())
}
