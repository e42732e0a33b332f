//! Formatted terminal output for a pipeline run.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::path::PathBuf;

use crate::domain::LoadedDataset;
use crate::fit::SeriesFit;
use crate::models::equation;

/// A compact "dataset / quantity / key" series name for report lines.
pub fn series_name(fit: &SeriesFit) -> String {
    format!(
        "{} / {} / {}",
        fit.dataset,
        fit.quantity.display_name().to_lowercase(),
        fit.key.column_tag()
    )
}

/// Format the full run summary: datasets, fitted equations, skips, artifacts.
pub fn format_run_summary(
    datasets: &[LoadedDataset],
    fits: &[SeriesFit],
    charts: &[PathBuf],
) -> String {
    let mut out = String::new();

    out.push_str("=== sortcurves - sorting cost growth curves ===\n");

    out.push_str("Datasets:\n");
    for d in datasets {
        let sizes = d.set.sizes();
        out.push_str(&format!(
            "- {} ({}): {} points, n=[{}, {}], model {}\n",
            d.source.label,
            d.source.display,
            d.set.len(),
            sizes.first().copied().unwrap_or(f64::NAN),
            sizes.last().copied().unwrap_or(f64::NAN),
            d.source.growth.display_name(),
        ));
    }

    out.push_str("\nFitted series:\n");
    for fit in fits {
        if let Ok(result) = &fit.outcome {
            out.push_str(&format!(
                "  {}: f(n) = {} (rmse={:.3})\n",
                series_name(fit),
                equation(result.kind, &result.coeffs),
                result.rmse,
            ));
        }
    }

    let skipped: Vec<&SeriesFit> = fits.iter().filter(|f| f.outcome.is_err()).collect();
    if !skipped.is_empty() {
        out.push_str("\nSkipped series (rendered points-only):\n");
        for fit in skipped {
            if let Err(e) = &fit.outcome {
                out.push_str(&format!("  {}: {e}\n", series_name(fit)));
            }
        }
    }

    out.push_str("\nCharts:\n");
    for path in charts {
        out.push_str(&format!("- {}\n", path.display()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DatasetSource, FitResult, GrowthKind, MeasurementSet, Quantity, SortKey,
    };
    use crate::fit::FitError;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn dataset() -> LoadedDataset {
        let mut columns = BTreeMap::new();
        columns.insert("avg_age_comp".to_string(), vec![12.0, 30.0, 52.0]);
        LoadedDataset {
            source: DatasetSource {
                label: "quick".to_string(),
                display: "Quick Sort".to_string(),
                path: PathBuf::from("results/summary.csv"),
                growth: GrowthKind::NLogN,
            },
            set: MeasurementSet::new("quick", vec![10.0, 20.0, 30.0], columns).unwrap(),
        }
    }

    #[test]
    fn summary_lists_equations_and_skips() {
        let fits = vec![
            SeriesFit {
                dataset: "quick".to_string(),
                key: SortKey::Age,
                quantity: Quantity::Comparisons,
                kind: GrowthKind::NLogN,
                outcome: Ok(FitResult {
                    kind: GrowthKind::NLogN,
                    coeffs: vec![0.49, 1.2],
                    sse: 0.5,
                    rmse: 0.408,
                }),
            },
            SeriesFit {
                dataset: "insertion".to_string(),
                key: SortKey::Name,
                quantity: Quantity::Assignments,
                kind: GrowthKind::Quadratic,
                outcome: Err(FitError::DidNotConverge),
            },
        ];

        let summary = format_run_summary(
            &[dataset()],
            &fits,
            &[PathBuf::from("plots/comparison_plots_comparisons.png")],
        );

        assert!(summary.contains("quick (Quick Sort): 3 points"), "{summary}");
        assert!(summary.contains("0.4900·n·log(n) + 1.20"), "{summary}");
        assert!(
            summary.contains("insertion / assignments / name: fit did not converge"),
            "{summary}"
        );
        assert!(summary.contains("comparison_plots_comparisons.png"), "{summary}");
    }
}
