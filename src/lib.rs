//! linepick: layered line-chart compositing with color-keyed series picking.
//!
//! Thousands of overlaid polylines are painted onto independent raster
//! layers. A hidden fixed-resolution identity layer paints every series in a
//! unique flat color so pointer queries resolve to a series id with a single
//! neighborhood sample instead of geometric intersection tests. Repaints are
//! spread over many ticks by a generation-stamped scheduler.

pub mod api;
pub mod core;
pub mod data;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{LineChart, LineChartConfig, SelectionCoordinator};
pub use error::{ChartError, ChartResult};
