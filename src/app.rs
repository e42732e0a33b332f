//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a `PlotConfig`
//! - runs the load → fit → render pipeline
//! - prints warnings and the run summary

use clap::Parser;

use crate::cli::Cli;
use crate::domain::{DatasetSource, GrowthKind, PlotConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sortcurves` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = plot_config_from_args(&cli);

    let output = pipeline::run(&config)?;

    for warning in &output.warnings {
        println!("Warning: {warning}");
    }
    print!(
        "{}",
        crate::report::format_run_summary(&output.datasets, &output.fits, &output.charts)
    );

    Ok(())
}

/// The dataset registry: which algorithms the pipeline knows, where their
/// summaries live, and which growth family each one is fitted against.
///
/// Quick and merge sort are divide-and-conquer (`n log n`); insertion sort is
/// quadratic. Only the quick sort summary is required to exist.
pub fn plot_config_from_args(cli: &Cli) -> PlotConfig {
    PlotConfig {
        primary: DatasetSource {
            label: "quick".to_string(),
            display: "Quick Sort".to_string(),
            path: cli.summary.clone(),
            growth: GrowthKind::NLogN,
        },
        secondary: vec![
            DatasetSource {
                label: "merge".to_string(),
                display: "Merge Sort".to_string(),
                path: cli.merge_summary.clone(),
                growth: GrowthKind::NLogN,
            },
            DatasetSource {
                label: "insertion".to_string(),
                display: "Insertion Sort".to_string(),
                path: cli.insertion_summary.clone(),
                growth: GrowthKind::Quadratic,
            },
        ],
        out_dir: cli.out_dir.clone(),
        width: cli.width,
        height: cli.height,
        export_fits: cli.export_fits.clone(),
    }
}
