use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{DataExtent, DataPoint};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Stable identifier of one loaded series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesId(u32);

impl SeriesId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SeriesId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// One polyline read from one data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub points: Vec<DataPoint>,
    /// Color used on the highlight layer.
    #[serde(default)]
    pub color: Option<Color>,
    /// Replaces the base line color on the shown and hidden layers.
    #[serde(default)]
    pub background_color: Option<Color>,
}

impl Trace {
    #[must_use]
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self {
            points,
            color: None,
            background_color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_background_color(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }

    #[must_use]
    pub fn extent(&self) -> Option<DataExtent> {
        DataExtent::from_points(&self.points)
    }
}

/// All traces loaded for one id. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    id: SeriesId,
    traces: SmallVec<[Trace; 1]>,
}

impl Series {
    pub fn new(id: SeriesId, traces: impl IntoIterator<Item = Trace>) -> ChartResult<Self> {
        let traces: SmallVec<[Trace; 1]> = traces.into_iter().collect();
        if traces.is_empty() {
            return Err(ChartError::InvalidData(format!(
                "series {id} must contain at least one trace"
            )));
        }
        Ok(Self { id, traces })
    }

    /// Convenience constructor for a single trace without colors.
    pub fn from_points(id: SeriesId, points: Vec<DataPoint>) -> ChartResult<Self> {
        Self::new(id, [Trace::new(points)])
    }

    #[must_use]
    pub fn id(&self) -> SeriesId {
        self.id
    }

    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.traces.iter().map(|trace| trace.points.len()).sum()
    }

    #[must_use]
    pub fn extent(&self) -> Option<DataExtent> {
        self.traces
            .iter()
            .filter_map(Trace::extent)
            .reduce(DataExtent::union)
    }
}
