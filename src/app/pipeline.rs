//! The shared load → fit → render pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow across
//! chart variants: the same parameterized pipeline serves every combination
//! of datasets and quantities, driven by the dataset registry in the config.
//!
//! The pipeline is a pure function of its config (plus the filesystem): no
//! module-level state, no working-directory changes.

use std::path::PathBuf;

use crate::domain::{
    ChartSpec, LoadedDataset, PanelSpec, PlotConfig, Quantity, SeriesSpec, SortKey, metric_column,
};
use crate::error::AppError;
use crate::fit::{self, SeriesFit};
use crate::io::ingest::load_measurement_set;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub datasets: Vec<LoadedDataset>,
    pub fits: Vec<SeriesFit>,
    /// One entry per degraded optional dataset (absent or malformed).
    pub warnings: Vec<String>,
    /// Paths of the rendered chart files.
    pub charts: Vec<PathBuf>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run(config: &PlotConfig) -> Result<RunOutput, AppError> {
    let required = required_columns();

    // 1) Load datasets. The primary must exist and be well-formed; optional
    //    comparison datasets degrade to a warning and are left out of every
    //    chart.
    let primary_set = load_measurement_set(&config.primary.path, &config.primary.label, &required)?
        .ok_or_else(|| {
            AppError::new(
                3,
                format!(
                    "{} summary file not found at '{}'",
                    config.primary.display,
                    config.primary.path.display()
                ),
            )
        })?;

    let mut datasets = vec![LoadedDataset {
        source: config.primary.clone(),
        set: primary_set,
    }];
    let mut warnings = Vec::new();

    for source in &config.secondary {
        match load_measurement_set(&source.path, &source.label, &required) {
            Ok(Some(set)) => datasets.push(LoadedDataset {
                source: source.clone(),
                set,
            }),
            Ok(None) => warnings.push(format!(
                "{} summary file not found at '{}'",
                source.display,
                source.path.display()
            )),
            Err(e) => warnings.push(format!("skipping {} dataset: {e}", source.display)),
        }
    }

    // 2) Fit every series (parallel; failures degrade to points-only series).
    let fits = fit::fit_datasets(&datasets);

    // 3) Render one chart per quantity.
    std::fs::create_dir_all(&config.out_dir).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Failed to create output directory '{}': {e}",
                config.out_dir.display()
            ),
        )
    })?;

    let mut charts = Vec::new();
    for quantity in Quantity::ALL {
        let spec = build_chart_spec(quantity, &datasets, &fits);
        charts.push(crate::plot::render_chart(
            &spec,
            &config.out_dir,
            config.width,
            config.height,
        )?);
    }

    // 4) Optional fit export.
    if let Some(path) = &config.export_fits {
        crate::io::export::write_fits_json(path, &fits)?;
    }

    Ok(RunOutput {
        datasets,
        fits,
        warnings,
        charts,
    })
}

/// Every metric column the charts request.
fn required_columns() -> Vec<String> {
    let mut columns = Vec::new();
    for quantity in Quantity::ALL {
        for key in SortKey::ALL {
            columns.push(metric_column(key, quantity));
        }
    }
    columns
}

/// Assemble the 2×2 comparison figure for one quantity:
/// three per-sort-key panels overlaying all available algorithms, plus a
/// summary panel overlaying the primary algorithm's three sort keys.
fn build_chart_spec(
    quantity: Quantity,
    datasets: &[LoadedDataset],
    fits: &[SeriesFit],
) -> ChartSpec {
    let displays: Vec<&str> = datasets.iter().map(|d| d.source.display.as_str()).collect();
    let title = format!(
        "{}: Average {}",
        displays.join(" vs "),
        quantity.display_name()
    );

    let mut panels = Vec::with_capacity(4);

    for (i, key) in SortKey::ALL.into_iter().enumerate() {
        let mut series = Vec::new();
        for (idx, dataset) in datasets.iter().enumerate() {
            let Some(points) = dataset.set.points(key, quantity) else {
                continue;
            };
            series.push(SeriesSpec {
                label: dataset.source.display.clone(),
                points,
                fit: fit::find_fit(fits, &dataset.source.label, key, quantity).cloned(),
                palette_idx: idx,
            });
        }
        panels.push(PanelSpec {
            title: panel_title(i, key),
            x_label: "n".to_string(),
            y_label: quantity.display_name().to_string(),
            series,
        });
    }

    // Summary panel: the primary algorithm's three sort keys side by side,
    // shifted along the palette so they do not reuse the per-dataset colors.
    let primary = &datasets[0];
    let mut series = Vec::new();
    for (i, key) in SortKey::ALL.into_iter().enumerate() {
        let Some(points) = primary.set.points(key, quantity) else {
            continue;
        };
        series.push(SeriesSpec {
            label: format!("{} ({})", key.display_name(), primary.source.display),
            points,
            fit: fit::find_fit(fits, &primary.source.label, key, quantity).cloned(),
            palette_idx: 3 + i,
        });
    }
    panels.push(PanelSpec {
        title: format!("{} Methods Comparison", primary.source.display),
        x_label: "n".to_string(),
        y_label: quantity.display_name().to_string(),
        series,
    });

    ChartSpec {
        title,
        file_name: format!("comparison_plots_{}.png", quantity.file_tag()),
        rows: 2,
        cols: 2,
        panels,
    }
}

fn panel_title(index: usize, key: SortKey) -> String {
    let letter = (b'a' + index as u8) as char;
    match key {
        SortKey::Combined => format!("({letter}) Combined Sort"),
        _ => format!("({letter}) Sort by {}", key.display_name()),
    }
}
