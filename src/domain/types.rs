//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and chart assembly
//! - exported to JSON for downstream tooling
//! - constructed directly in tests without any I/O

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which record field the benchmark sorted by.
///
/// The benchmark harness counts comparisons/assignments separately for sorting
/// by age, by name, and by the combined (age, name) ordering; each variant maps
/// to its own pair of metric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Age,
    Name,
    Combined,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Age, SortKey::Name, SortKey::Combined];

    /// Column-name fragment used by the benchmark CSVs.
    pub fn column_tag(self) -> &'static str {
        match self {
            SortKey::Age => "age",
            SortKey::Name => "name",
            SortKey::Combined => "combined",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SortKey::Age => "Age",
            SortKey::Name => "Name",
            SortKey::Combined => "Combined",
        }
    }
}

/// Which cost counter a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Comparisons,
    Assignments,
}

impl Quantity {
    pub const ALL: [Quantity; 2] = [Quantity::Comparisons, Quantity::Assignments];

    /// Column-name fragment used by the benchmark CSVs.
    pub fn column_tag(self) -> &'static str {
        match self {
            Quantity::Comparisons => "comp",
            Quantity::Assignments => "assign",
        }
    }

    /// Axis / title label ("Comparisons" or "Assignments").
    pub fn display_name(self) -> &'static str {
        match self {
            Quantity::Comparisons => "Comparisons",
            Quantity::Assignments => "Assignments",
        }
    }

    /// File-name fragment for the rendered chart of this quantity.
    pub fn file_tag(self) -> &'static str {
        match self {
            Quantity::Comparisons => "comparisons",
            Quantity::Assignments => "assignments",
        }
    }
}

/// Name of the averaged metric column for a (sort key, quantity) pair.
///
/// Example: `metric_column(SortKey::Age, Quantity::Comparisons)` is
/// `"avg_age_comp"`.
pub fn metric_column(key: SortKey, quantity: Quantity) -> String {
    format!("avg_{}_{}", key.column_tag(), quantity.column_tag())
}

/// Growth-model family fitted to a series.
///
/// Each algorithm label maps to the family matching its expected asymptotic
/// cost; the fitter only estimates the free coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthKind {
    /// `f(n) = a·n·ln(n) + b` — divide-and-conquer sorts.
    NLogN,
    /// `f(n) = a·n² + b·n + c` — quadratic sorts.
    Quadratic,
}

impl GrowthKind {
    /// Number of free coefficients the family has.
    pub fn param_len(self) -> usize {
        match self {
            GrowthKind::NLogN => 2,
            GrowthKind::Quadratic => 3,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GrowthKind::NLogN => "n log n",
            GrowthKind::Quadratic => "n^2",
        }
    }
}

/// One algorithm's measurements: input sizes plus named metric columns.
///
/// Invariants enforced at construction:
/// - `n` values are finite, strictly positive, and unique
/// - every metric column has exactly `n.len()` finite, non-negative values
/// - rows are sorted ascending by `n` (sources may be unsorted)
#[derive(Debug, Clone)]
pub struct MeasurementSet {
    pub label: String,
    n: Vec<f64>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl MeasurementSet {
    /// Validate, sort by `n`, and build a set. Errors are plain strings; the
    /// loader wraps them with dataset path context.
    pub fn new(
        label: impl Into<String>,
        n: Vec<f64>,
        columns: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self, String> {
        if n.is_empty() {
            return Err("dataset has no rows".to_string());
        }
        for (i, &v) in n.iter().enumerate() {
            if !v.is_finite() || v <= 0.0 {
                return Err(format!("row {}: input size n must be positive, got {v}", i + 1));
            }
        }
        for (name, values) in &columns {
            if values.len() != n.len() {
                return Err(format!(
                    "column '{name}' has {} values but there are {} input sizes",
                    values.len(),
                    n.len()
                ));
            }
            if let Some(&bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(format!("column '{name}' has an invalid value {bad}"));
            }
        }

        // Sort rows ascending by n, permuting every column the same way.
        let mut order: Vec<usize> = (0..n.len()).collect();
        order.sort_by(|&a, &b| n[a].partial_cmp(&n[b]).unwrap_or(std::cmp::Ordering::Equal));

        let sorted_n: Vec<f64> = order.iter().map(|&i| n[i]).collect();
        if sorted_n.windows(2).any(|w| w[0] == w[1]) {
            return Err("duplicate input size n".to_string());
        }
        let sorted_columns = columns
            .into_iter()
            .map(|(name, values)| {
                let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
                (name, sorted)
            })
            .collect();

        Ok(Self {
            label: label.into(),
            n: sorted_n,
            columns: sorted_columns,
        })
    }

    /// Number of measurement rows.
    pub fn len(&self) -> usize {
        self.n.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }

    /// Ascending input sizes.
    pub fn sizes(&self) -> &[f64] {
        &self.n
    }

    /// A metric column by raw name, aligned to [`MeasurementSet::sizes`].
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// A metric column by (sort key, quantity).
    pub fn metric(&self, key: SortKey, quantity: Quantity) -> Option<&[f64]> {
        self.column(&metric_column(key, quantity))
    }

    /// `(n, value)` pairs for one metric, ready for scatter plotting.
    pub fn points(&self, key: SortKey, quantity: Quantity) -> Option<Vec<(f64, f64)>> {
        self.metric(key, quantity)
            .map(|values| self.n.iter().copied().zip(values.iter().copied()).collect())
    }
}

/// Best-fit coefficients for one (dataset, metric) series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub kind: GrowthKind,
    /// Coefficient vector, length `kind.param_len()`.
    pub coeffs: Vec<f64>,
    /// Sum of squared residuals at the fitted coefficients.
    pub sse: f64,
    /// Root-mean-square residual.
    pub rmse: f64,
}

/// One dataset the pipeline should try to load.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    /// Short identifier used in reports and exports (e.g. "quick").
    pub label: String,
    /// Human-facing name used in chart titles and legends (e.g. "Quick Sort").
    pub display: String,
    pub path: PathBuf,
    pub growth: GrowthKind,
}

/// A dataset that was actually found and validated.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub source: DatasetSource,
    pub set: MeasurementSet,
}

/// Resolved configuration for one pipeline run.
///
/// All paths are explicit: the pipeline never changes the working directory
/// and never derives locations from its own binary path.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// The required dataset; its absence fails the run.
    pub primary: DatasetSource,
    /// Optional comparison datasets; absence degrades to a warning.
    pub secondary: Vec<DatasetSource>,
    /// Chart output directory, created if absent.
    pub out_dir: PathBuf,
    /// Figure size in pixels.
    pub width: u32,
    pub height: u32,
    /// Optional JSON export of all fitted coefficients.
    pub export_fits: Option<PathBuf>,
}

/// One overlay within a panel: observed points plus an optional fitted curve.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub fit: Option<FitResult>,
    /// Index into the shared palette; also selects the marker shape.
    pub palette_idx: usize,
}

/// One subplot: title, axis labels, and the series it overlays.
#[derive(Debug, Clone)]
pub struct PanelSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<SeriesSpec>,
}

/// A complete figure: panels laid out on a grid, rendered to one file.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    /// File name under the output directory (e.g. "comparison_plots_comparisons.png").
    pub file_name: String,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<PanelSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(values: &[(&str, &[f64])]) -> BTreeMap<String, Vec<f64>> {
        values
            .iter()
            .map(|(name, v)| (name.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn measurement_set_sorts_rows_by_n() {
        let set = MeasurementSet::new(
            "quick",
            vec![30.0, 10.0, 20.0],
            columns(&[("avg_age_comp", &[3.0, 1.0, 2.0])]),
        )
        .unwrap();

        assert_eq!(set.sizes(), &[10.0, 20.0, 30.0]);
        assert_eq!(set.column("avg_age_comp").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn measurement_set_rejects_bad_inputs() {
        assert!(MeasurementSet::new("x", vec![], BTreeMap::new()).is_err());
        assert!(MeasurementSet::new("x", vec![0.0], BTreeMap::new()).is_err());
        assert!(MeasurementSet::new("x", vec![10.0, 10.0], BTreeMap::new()).is_err());
        assert!(
            MeasurementSet::new("x", vec![10.0, 20.0], columns(&[("m", &[1.0])])).is_err(),
            "length mismatch must be rejected"
        );
        assert!(
            MeasurementSet::new("x", vec![10.0], columns(&[("m", &[-1.0])])).is_err(),
            "negative observations must be rejected"
        );
    }

    #[test]
    fn metric_column_names_match_benchmark_schema() {
        assert_eq!(metric_column(SortKey::Age, Quantity::Comparisons), "avg_age_comp");
        assert_eq!(
            metric_column(SortKey::Combined, Quantity::Assignments),
            "avg_combined_assign"
        );
    }
}
