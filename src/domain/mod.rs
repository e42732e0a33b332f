//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - metric naming enums (`SortKey`, `Quantity`) and the growth-model tag (`GrowthKind`)
//! - validated measurement data (`MeasurementSet`)
//! - fit outputs (`FitResult`)
//! - chart declarations (`ChartSpec`, `PanelSpec`, `SeriesSpec`)
//! - run configuration (`PlotConfig`, `DatasetSource`)

pub mod types;

pub use types::*;
