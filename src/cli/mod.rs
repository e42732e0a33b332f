//! Command-line parsing for the sorting-benchmark curve plotter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/plotting code. Every input and output location is an explicit
//! argument with a conventional default; the tool never derives paths from
//! its own location or changes the working directory.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sortcurves",
    version,
    about = "Fit growth curves to sorting benchmark results and render comparison charts"
)]
pub struct Cli {
    /// Primary quick sort summary CSV (required to exist).
    #[arg(long, default_value = "results/summary.csv")]
    pub summary: PathBuf,

    /// Merge sort summary CSV (optional; skipped with a warning if absent).
    #[arg(long, default_value = "comparison_data/merge_sort/results/summary.csv")]
    pub merge_summary: PathBuf,

    /// Insertion sort summary CSV (optional; skipped with a warning if absent).
    #[arg(long, default_value = "comparison_data/insertion_sort/results/summary.csv")]
    pub insertion_summary: PathBuf,

    /// Output directory for rendered charts (created if absent).
    #[arg(long, default_value = "plots")]
    pub out_dir: PathBuf,

    /// Figure width in pixels.
    #[arg(long, default_value_t = 1400)]
    pub width: u32,

    /// Figure height in pixels.
    #[arg(long, default_value_t = 1100)]
    pub height: u32,

    /// Write all fitted coefficients to a JSON file.
    #[arg(long)]
    pub export_fits: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_benchmark_layout() {
        let cli = Cli::parse_from(["sortcurves"]);
        assert_eq!(cli.summary, PathBuf::from("results/summary.csv"));
        assert_eq!(cli.out_dir, PathBuf::from("plots"));
        assert!(cli.export_fits.is_none());
    }

    #[test]
    fn paths_are_overridable() {
        let cli = Cli::parse_from([
            "sortcurves",
            "--summary",
            "/data/quick.csv",
            "--out-dir",
            "/tmp/charts",
            "--export-fits",
            "/tmp/fits.json",
        ]);
        assert_eq!(cli.summary, PathBuf::from("/data/quick.csv"));
        assert_eq!(cli.out_dir, PathBuf::from("/tmp/charts"));
        assert_eq!(cli.export_fits, Some(PathBuf::from("/tmp/fits.json")));
    }
}
