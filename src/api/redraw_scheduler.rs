use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{CoordinateMapper, SeriesId, SeriesStore};
use crate::error::ChartResult;
use crate::render::{ColorMode, Compositor, Generation, LayerKind, RasterSurface};

use super::{Clock, RedrawTask, StepBudget, TaskState};

/// Per-tick budgets of display layers and of the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedrawBudgets {
    #[serde(default = "default_display_budget")]
    pub display: StepBudget,
    #[serde(default = "default_identity_budget")]
    pub identity: StepBudget,
}

impl Default for RedrawBudgets {
    fn default() -> Self {
        Self {
            display: default_display_budget(),
            identity: default_identity_budget(),
        }
    }
}

impl RedrawBudgets {
    #[must_use]
    pub fn get(self, layer: LayerKind) -> StepBudget {
        match layer {
            LayerKind::Identity => self.identity,
            LayerKind::Hidden | LayerKind::Shown | LayerKind::Highlight => self.display,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        self.display.validate()?;
        self.identity.validate()
    }
}

fn default_display_budget() -> StepBudget {
    StepBudget::series(25)
}

fn default_identity_budget() -> StepBudget {
    StepBudget::series(10)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Idle,
    Running,
}

/// Aggregate result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub painted: usize,
    /// Tasks found stale during this tick.
    pub superseded: usize,
    /// Work remains after this tick.
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingIdentity {
    items: Vec<SeriesId>,
    due: Duration,
}

/// Owns at most one redraw task per layer and advances all of them a
/// budgeted step per tick.
///
/// Identity redraws are debounced: each request replaces the pending list
/// and pushes the start time out by the debounce delay.
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawScheduler {
    tasks: [Option<RedrawTask>; 4],
    budgets: RedrawBudgets,
    identity_debounce: Duration,
    pending_identity: Option<PendingIdentity>,
    superseded_total: u64,
}

impl RedrawScheduler {
    #[must_use]
    pub fn new(budgets: RedrawBudgets, identity_debounce: Duration) -> Self {
        Self {
            tasks: [None, None, None, None],
            budgets,
            identity_debounce,
            pending_identity: None,
            superseded_total: 0,
        }
    }

    #[must_use]
    pub fn budgets(&self) -> RedrawBudgets {
        self.budgets
    }

    #[must_use]
    pub fn task(&self, layer: LayerKind) -> Option<&RedrawTask> {
        self.tasks[layer.index()].as_ref()
    }

    #[must_use]
    pub fn layer_state(&self, layer: LayerKind) -> LayerState {
        match self.task(layer) {
            Some(task) if task.state() == TaskState::Running => LayerState::Running,
            _ => LayerState::Idle,
        }
    }

    #[must_use]
    pub fn has_pending_identity(&self) -> bool {
        self.pending_identity.is_some()
    }

    /// Number of tasks abandoned because their layer was cleared again.
    #[must_use]
    pub fn superseded_total(&self) -> u64 {
        self.superseded_total
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending_identity.is_some()
            || LayerKind::ALL
                .into_iter()
                .any(|layer| self.layer_state(layer) == LayerState::Running)
    }

    /// Clears `layer` now and queues `items` for incremental painting. A task
    /// still running on the layer is superseded.
    pub fn request_redraw<S: RasterSurface>(
        &mut self,
        layer: LayerKind,
        items: Vec<SeriesId>,
        mode: ColorMode,
        compositor: &mut Compositor<S>,
    ) -> Generation {
        let generation = compositor.begin_redraw(layer);
        if let Some(mut previous) = self.tasks[layer.index()].take() {
            if previous.state() == TaskState::Running {
                previous.mark_superseded();
                self.superseded_total += 1;
                trace!(
                    ?layer,
                    stale = previous.generation().raw(),
                    current = generation.raw(),
                    "redraw superseded"
                );
            }
        }
        if layer == LayerKind::Identity {
            self.pending_identity = None;
        }
        debug!(
            ?layer,
            series = items.len(),
            generation = generation.raw(),
            "redraw requested"
        );
        self.tasks[layer.index()] = Some(RedrawTask::new(layer, mode, items, generation));
        generation
    }

    /// Schedules an identity redraw of `items` once `now + debounce` has
    /// passed without another request.
    pub fn request_identity_redraw(&mut self, items: Vec<SeriesId>, now: Duration) {
        let due = now + self.identity_debounce;
        trace!(
            series = items.len(),
            due_ms = due.as_millis() as u64,
            "identity redraw debounced"
        );
        self.pending_identity = Some(PendingIdentity { items, due });
    }

    /// Adds `id` to the work of `layer` without clearing it.
    ///
    /// A pending identity request absorbs the id; a running task on the
    /// layer's current generation gets it queued; otherwise a new task is
    /// started on the current generation.
    pub fn append<S: RasterSurface>(
        &mut self,
        layer: LayerKind,
        id: SeriesId,
        mode: ColorMode,
        compositor: &Compositor<S>,
    ) {
        if layer == LayerKind::Identity {
            if let Some(pending) = self.pending_identity.as_mut() {
                if !pending.items.contains(&id) {
                    pending.items.push(id);
                }
                return;
            }
        }

        let generation = compositor.generation(layer);
        match self.tasks[layer.index()].as_mut() {
            Some(task)
                if task.generation() == generation && task.state() != TaskState::Superseded =>
            {
                task.extend([id]);
            }
            _ => {
                self.tasks[layer.index()] =
                    Some(RedrawTask::new(layer, mode, vec![id], generation));
            }
        }
        trace!(?layer, series = %id, "series appended to redraw");
    }

    /// Drops every task and pending request.
    pub fn reset(&mut self) {
        self.tasks = [None, None, None, None];
        self.pending_identity = None;
    }

    /// Starts a due identity redraw, then advances every running task by one
    /// budgeted step.
    pub fn tick<S: RasterSurface>(
        &mut self,
        compositor: &mut Compositor<S>,
        store: &SeriesStore,
        mapper: &CoordinateMapper,
        clock: &dyn Clock,
    ) -> TickSummary {
        let now = clock.now();
        if self
            .pending_identity
            .as_ref()
            .is_some_and(|pending| pending.due <= now)
        {
            if let Some(pending) = self.pending_identity.take() {
                self.request_redraw(
                    LayerKind::Identity,
                    pending.items,
                    ColorMode::Identity,
                    compositor,
                );
            }
        }

        let mut summary = TickSummary::default();
        for layer in LayerKind::ALL {
            let budget = self.budgets.get(layer);
            let slot = &mut self.tasks[layer.index()];
            let Some(task) = slot.as_mut() else {
                continue;
            };
            let outcome = task.step(budget, compositor, store, mapper, clock);
            summary.painted += outcome.painted;
            match outcome.state {
                TaskState::Running => {}
                TaskState::Completed => {
                    trace!(?layer, "redraw completed");
                }
                TaskState::Superseded => {
                    summary.superseded += 1;
                    self.superseded_total += 1;
                    *slot = None;
                }
            }
        }
        summary.busy = self.is_busy();
        summary
    }
}
