use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{Series, SeriesId, Trace};
use crate::data::{DataSetSpec, parse_points};
use crate::error::{ChartError, ChartResult};

/// Handle pairing a fetch completion with the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A file the host must fetch and hand back through `complete_fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub id: SeriesId,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Other traces of the same id are still outstanding.
    Pending,
    Loaded(Series),
    Failed { id: SeriesId, reason: String },
}

/// Per-batch counters, reset when a new batch starts after the previous one
/// was reported finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub requested: usize,
    pub completed: usize,
    pub loaded: usize,
    pub failed: usize,
}

#[derive(Debug)]
struct PendingSeries {
    specs: Vec<DataSetSpec>,
    traces: Vec<Option<Trace>>,
    remaining: usize,
    failure: Option<String>,
}

/// Tracks outstanding fetches. Completions may arrive in any order; an id is
/// finalized once its own completion counter reaches zero, and the batch
/// once no id is outstanding.
#[derive(Debug, Default)]
pub struct LoadTracker {
    next_ticket: u64,
    tickets: HashMap<FetchTicket, (SeriesId, usize)>,
    pending: IndexMap<SeriesId, PendingSeries>,
    progress: LoadProgress,
    finish_reported: bool,
}

impl LoadTracker {
    #[must_use]
    pub fn is_pending(&self, id: SeriesId) -> bool {
        self.pending.contains_key(&id)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    fn start_batch_if_idle(&mut self) {
        if self.pending.is_empty() && self.finish_reported {
            self.progress = LoadProgress::default();
            self.finish_reported = false;
        }
    }

    /// Registers `id` with its data files and returns one fetch request per
    /// file. `specs` must not be empty.
    pub fn begin(
        &mut self,
        id: SeriesId,
        specs: Vec<DataSetSpec>,
    ) -> ChartResult<Vec<FetchRequest>> {
        if specs.is_empty() {
            return Err(ChartError::InvalidData(format!(
                "series {id} has no data files"
            )));
        }
        if self.is_pending(id) {
            return Err(ChartError::InvalidData(format!(
                "series {id} is already loading"
            )));
        }
        self.start_batch_if_idle();
        self.progress.requested += 1;

        let requests = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let ticket = FetchTicket(self.next_ticket);
                self.next_ticket += 1;
                self.tickets.insert(ticket, (id, index));
                FetchRequest {
                    ticket,
                    id,
                    file: spec.file.clone(),
                }
            })
            .collect::<Vec<_>>();

        debug!(series = %id, files = specs.len(), "series load started");
        self.pending.insert(
            id,
            PendingSeries {
                traces: vec![None; specs.len()],
                remaining: specs.len(),
                specs,
                failure: None,
            },
        );
        Ok(requests)
    }

    /// Counts `id` as requested and immediately failed (no data available).
    pub fn reject(&mut self, id: SeriesId) {
        self.start_batch_if_idle();
        self.progress.requested += 1;
        self.progress.completed += 1;
        self.progress.failed += 1;
        debug!(series = %id, "no data source for series");
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<String, String>,
    ) -> ChartResult<LoadOutcome> {
        let (id, index) = self
            .tickets
            .remove(&ticket)
            .ok_or(ChartError::UnknownFetchTicket(ticket.raw()))?;
        let entry = self
            .pending
            .get_mut(&id)
            .ok_or(ChartError::UnknownFetchTicket(ticket.raw()))?;
        let spec = &entry.specs[index];

        let parsed = match result {
            Ok(text) => parse_points(&text, spec),
            Err(reason) => Err(ChartError::Fetch {
                file: spec.file.clone(),
                reason,
            }),
        };
        match parsed {
            Ok(points) => {
                entry.traces[index] = Some(
                    Trace::new(points)
                        .with_color(spec.color)
                        .with_background_color(spec.background_color),
                );
            }
            Err(err) => {
                warn!(series = %id, error = %err, "trace load failed");
                entry.failure.get_or_insert_with(|| err.to_string());
            }
        }

        entry.remaining -= 1;
        if entry.remaining > 0 {
            return Ok(LoadOutcome::Pending);
        }

        let Some(finished) = self.pending.shift_remove(&id) else {
            return Ok(LoadOutcome::Pending);
        };
        self.progress.completed += 1;
        let outcome = match finished.failure {
            Some(reason) => LoadOutcome::Failed { id, reason },
            None => match Series::new(id, finished.traces.into_iter().flatten()) {
                Ok(series) => LoadOutcome::Loaded(series),
                Err(err) => LoadOutcome::Failed {
                    id,
                    reason: err.to_string(),
                },
            },
        };
        match &outcome {
            LoadOutcome::Loaded(_) => self.progress.loaded += 1,
            _ => self.progress.failed += 1,
        }
        Ok(outcome)
    }

    /// Returns the batch counters once, after the last outstanding id of the
    /// batch completed.
    pub fn take_finished(&mut self) -> Option<LoadProgress> {
        if self.is_loading() || self.finish_reported || self.progress.requested == 0 {
            return None;
        }
        self.finish_reported = true;
        Some(self.progress)
    }

    /// Forgets every outstanding fetch; late completions become unknown tickets.
    pub fn clear(&mut self) {
        self.tickets.clear();
        self.pending.clear();
        self.progress = LoadProgress::default();
        self.finish_reported = false;
    }
}
