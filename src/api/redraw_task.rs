use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::{CoordinateMapper, SeriesId, SeriesStore};
use crate::error::{ChartError, ChartResult};
use crate::render::{ColorMode, Compositor, Generation, LayerKind, RasterSurface};

use super::Clock;

/// Work allowed for one task in one tick.
///
/// When `max_micros` is set the elapsed time is the real limit and
/// `max_series` only caps it; at least one series is painted per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBudget {
    pub max_series: usize,
    #[serde(default)]
    pub max_micros: Option<u64>,
}

impl StepBudget {
    #[must_use]
    pub const fn series(max_series: usize) -> Self {
        Self {
            max_series,
            max_micros: None,
        }
    }

    #[must_use]
    pub const fn with_time_limit(mut self, micros: u64) -> Self {
        self.max_micros = Some(micros);
        self
    }

    #[must_use]
    pub fn max_duration(self) -> Option<Duration> {
        self.max_micros.map(Duration::from_micros)
    }

    pub fn validate(self) -> ChartResult<()> {
        if self.max_series == 0 {
            return Err(ChartError::Config(
                "redraw budget must allow at least one series per tick".to_owned(),
            ));
        }
        if self.max_micros == Some(0) {
            return Err(ChartError::Config(
                "redraw time budget must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Running,
    Completed,
    /// The layer was cleared again after this task started; its remaining
    /// work is discarded.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub painted: usize,
    pub state: TaskState,
}

/// Paints a list of series onto one layer, a budgeted slice per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawTask {
    layer: LayerKind,
    mode: ColorMode,
    items: Vec<SeriesId>,
    cursor: usize,
    generation: Generation,
    state: TaskState,
}

impl RedrawTask {
    #[must_use]
    pub fn new(
        layer: LayerKind,
        mode: ColorMode,
        items: Vec<SeriesId>,
        generation: Generation,
    ) -> Self {
        let state = if items.is_empty() {
            TaskState::Completed
        } else {
            TaskState::Running
        };
        Self {
            layer,
            mode,
            items,
            cursor: 0,
            generation,
            state,
        }
    }

    #[must_use]
    pub fn layer(&self) -> LayerKind {
        self.layer
    }

    #[must_use]
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[must_use]
    pub fn items(&self) -> &[SeriesId] {
        &self.items
    }

    /// `(painted or skipped, total)` series of this task.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.items.len())
    }

    /// Queues more series behind the current ones.
    pub fn extend(&mut self, items: impl IntoIterator<Item = SeriesId>) {
        let before = self.items.len();
        self.items.extend(items);
        if self.state == TaskState::Completed && self.items.len() > before {
            self.state = TaskState::Running;
        }
    }

    pub fn mark_superseded(&mut self) {
        self.state = TaskState::Superseded;
    }

    /// Paints series in list order until the budget is spent. The layer's
    /// generation is checked before every write.
    pub fn step<S: RasterSurface>(
        &mut self,
        budget: StepBudget,
        compositor: &mut Compositor<S>,
        store: &SeriesStore,
        mapper: &CoordinateMapper,
        clock: &dyn Clock,
    ) -> StepOutcome {
        let started = clock.now();
        let max_series = budget.max_series.max(1);
        let mut painted = 0;

        while self.state == TaskState::Running && self.cursor < self.items.len() {
            if !compositor.is_current(self.layer, self.generation) {
                self.state = TaskState::Superseded;
                break;
            }
            if painted >= max_series {
                break;
            }
            if painted > 0 {
                if let Some(limit) = budget.max_duration() {
                    if clock.now().saturating_sub(started) >= limit {
                        break;
                    }
                }
            }

            let id = self.items[self.cursor];
            self.cursor += 1;
            let Some(series) = store.get(id) else {
                continue;
            };
            match compositor.paint_series(self.layer, self.generation, series, self.mode, mapper) {
                Ok(true) => painted += 1,
                Ok(false) => self.state = TaskState::Superseded,
                Err(err) => {
                    warn!(
                        layer = ?self.layer,
                        series = %id,
                        error = %err,
                        "skipping unpaintable series"
                    );
                }
            }
        }

        if self.state == TaskState::Running && self.cursor >= self.items.len() {
            self.state = TaskState::Completed;
        }
        if self.state == TaskState::Superseded {
            trace!(
                layer = ?self.layer,
                generation = self.generation.raw(),
                "discarding superseded redraw"
            );
        }
        StepOutcome {
            painted,
            state: self.state,
        }
    }
}
