//! Host-facing line chart facade and its redraw machinery.

mod clock;
mod data_controller;
mod engine_config;
mod interaction_controller;
mod line_chart;
mod redraw_scheduler;
mod redraw_task;
mod selection_coordinator;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine_config::LineChartConfig;
pub use line_chart::{LineChart, TickReport};
pub use redraw_scheduler::{LayerState, RedrawBudgets, RedrawScheduler, TickSummary};
pub use redraw_task::{RedrawTask, StepBudget, StepOutcome, TaskState};
pub use selection_coordinator::SelectionCoordinator;
