//! Plotters-powered multi-panel chart rendering.
//!
//! The renderer is intentionally data-driven: a [`ChartSpec`] fully describes
//! the figure (title, grid shape, per-panel series), so `render_chart` only
//! draws. This keeps chart assembly testable without touching a backend and
//! makes the renderer indifferent to which datasets were actually found.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{ChartSpec, FitResult, PanelSpec};
use crate::error::AppError;
use crate::models::{equation, predict};

/// Number of evenly spaced samples used to draw a fitted curve.
const CURVE_SAMPLES: usize = 400;

/// Fraction of the observed `n` range the fitted curve extends past the
/// largest observation, to show the trend continuing.
const EXTRAPOLATION: f64 = 0.2;

/// Shared series palette; the index also selects the marker shape, so
/// overlapping series stay distinguishable in grayscale prints.
const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),  // blue
    RGBColor(44, 160, 44),   // green
    RGBColor(214, 39, 40),   // red
    RGBColor(23, 190, 207),  // cyan
    RGBColor(148, 103, 189), // purple
    RGBColor(255, 127, 14),  // orange
];

/// Render one chart to a PNG under `out_dir` and return its path.
pub fn render_chart(
    spec: &ChartSpec,
    out_dir: &Path,
    width: u32,
    height: u32,
) -> Result<PathBuf, AppError> {
    let path = out_dir.join(&spec.file_name);
    draw_figure(spec, &path, width, height).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to render chart '{}': {e}", path.display()),
        )
    })?;
    Ok(path)
}

fn draw_figure(
    spec: &ChartSpec,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let titled = root.titled(
        &spec.title,
        ("sans-serif", 28).into_font().style(FontStyle::Bold),
    )?;

    let areas = titled.split_evenly((spec.rows, spec.cols));
    for (panel, area) in spec.panels.iter().zip(areas.iter()) {
        draw_panel(panel, area)?;
    }

    // An explicit present() surfaces filesystem write errors instead of
    // losing them in a Drop.
    titled.present()?;
    Ok(())
}

/// Dense fitted-curve samples over `[x_lo, x_hi]`.
pub fn curve_points(fit: &FitResult, x_lo: f64, x_hi: f64) -> Vec<(f64, f64)> {
    (0..CURVE_SAMPLES)
        .map(|i| {
            let u = i as f64 / (CURVE_SAMPLES as f64 - 1.0);
            let x = x_lo + u * (x_hi - x_lo);
            (x, predict(fit.kind, x, &fit.coeffs))
        })
        .collect()
}

fn draw_panel(
    panel: &PanelSpec,
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Observed x-range, extended past the maximum so fitted curves show the
    // trend continuing. The extension is drawn as a line, never as points.
    let xs = panel
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(x, _)| x));
    let x_min = xs.clone().fold(f64::INFINITY, f64::min);
    let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
    let (x_lo, x_hi) = if x_min.is_finite() && x_max > x_min {
        (x_min, x_max + EXTRAPOLATION * (x_max - x_min))
    } else if x_min.is_finite() {
        (x_min - 1.0, x_min + 1.0)
    } else {
        (0.0, 1.0)
    };

    // Curve samples are computed up front so the y-range covers them too.
    let curves: Vec<Option<Vec<(f64, f64)>>> = panel
        .series
        .iter()
        .map(|s| s.fit.as_ref().map(|fit| curve_points(fit, x_lo, x_hi)))
        .collect();

    let ys = panel
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(_, y)| y))
        .chain(
            curves
                .iter()
                .flatten()
                .flat_map(|c| c.iter().map(|&(_, y)| y)),
        );
    let y_min = ys.clone().fold(f64::INFINITY, f64::min);
    let y_max = ys.fold(f64::NEG_INFINITY, f64::max);
    let (y_lo, y_hi) = if y_min.is_finite() && y_max > y_min {
        let pad = 0.05 * (y_max - y_min);
        (y_min - pad, y_max + pad)
    } else if y_min.is_finite() {
        (y_min - 1.0, y_min + 1.0)
    } else {
        (0.0, 1.0)
    };

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title.as_str(), ("sans-serif", 18))
        .margin(8)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT)
        .label_style(("sans-serif", 12))
        .draw()?;

    for (series, curve) in panel.series.iter().zip(curves.iter()) {
        let color = PALETTE[series.palette_idx % PALETTE.len()];

        match series.palette_idx % 3 {
            0 => {
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
                    )?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
            }
            1 => {
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&(x, y)| TriangleMarker::new((x, y), 5, color.filled())),
                    )?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| TriangleMarker::new((x + 10, y), 5, color.filled()));
            }
            _ => {
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&(x, y)| Cross::new((x, y), 4, color.stroke_width(2))),
                    )?
                    .label(series.label.as_str())
                    .legend(move |(x, y)| Cross::new((x + 10, y), 4, color.stroke_width(2)));
            }
        }

        if let (Some(points), Some(fit)) = (curve, series.fit.as_ref()) {
            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    color.stroke_width(2),
                ))?
                .label(format!(
                    "{} fit: {}",
                    series.label,
                    equation(fit.kind, &fit.coeffs)
                ))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
        }
    }

    if !panel.series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .label_font(("sans-serif", 12))
            .draw()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GrowthKind, SeriesSpec};

    #[test]
    fn curve_points_span_the_requested_range() {
        let fit = FitResult {
            kind: GrowthKind::Quadratic,
            coeffs: vec![1.0, 0.0, 0.0],
            sse: 0.0,
            rmse: 0.0,
        };
        let pts = curve_points(&fit, 10.0, 60.0);
        assert_eq!(pts.len(), 400);
        assert_eq!(pts.first().unwrap().0, 10.0);
        assert_eq!(pts.last().unwrap().0, 60.0);
        assert!((pts.last().unwrap().1 - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn renders_a_minimal_figure_to_disk() {
        let spec = ChartSpec {
            title: "Smoke".to_string(),
            file_name: format!("sortcurves_chart_smoke_{}.png", std::process::id()),
            rows: 1,
            cols: 2,
            panels: vec![
                PanelSpec {
                    title: "with series".to_string(),
                    x_label: "n".to_string(),
                    y_label: "Comparisons".to_string(),
                    series: vec![SeriesSpec {
                        label: "Quick Sort".to_string(),
                        points: vec![(10.0, 12.0), (20.0, 30.0), (30.0, 52.0)],
                        fit: Some(FitResult {
                            kind: GrowthKind::NLogN,
                            coeffs: vec![0.5, 2.0],
                            sse: 0.1,
                            rmse: 0.2,
                        }),
                        palette_idx: 0,
                    }],
                },
                // A panel with no series must still render.
                PanelSpec {
                    title: "empty".to_string(),
                    x_label: "n".to_string(),
                    y_label: "Comparisons".to_string(),
                    series: vec![],
                },
            ],
        };

        let out_dir = std::env::temp_dir();
        let path = render_chart(&spec, &out_dir, 640, 320).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(metadata.len() > 0);
    }
}
