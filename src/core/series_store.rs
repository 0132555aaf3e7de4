use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::core::{DataExtent, Series, SeriesId};
use crate::interaction::InteractionMode;

/// Which display working set a loaded series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Shown,
    Hidden,
}

/// Result of inserting a freshly loaded series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreInsert {
    pub membership: Membership,
    pub extent_changed: bool,
}

/// Loaded series plus the shown/hidden/highlighted working sets.
///
/// Every loaded id is in exactly one of `shown`/`hidden`. `highlighted` is an
/// independent subset of loaded ids.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    loaded: IndexMap<SeriesId, Series>,
    selection: IndexSet<SeriesId>,
    shown: IndexSet<SeriesId>,
    hidden: IndexSet<SeriesId>,
    highlighted: IndexSet<SeriesId>,
    extent: Option<DataExtent>,
}

impl SeriesStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a series. New ids join `shown` when the remembered
    /// selection names them and `hidden` otherwise; replaced ids keep their
    /// current membership.
    pub fn insert(&mut self, series: Series) -> StoreInsert {
        let id = series.id();
        let previous_extent = self.extent;
        if let Some(series_extent) = series.extent() {
            self.extent = Some(match self.extent {
                Some(extent) => extent.union(series_extent),
                None => series_extent,
            });
        }
        self.loaded.insert(id, series);

        let membership = match self.membership(id) {
            Some(existing) => existing,
            None if self.selection.contains(&id) => {
                self.shown.insert(id);
                Membership::Shown
            }
            None => {
                self.hidden.insert(id);
                Membership::Hidden
            }
        };

        StoreInsert {
            membership,
            extent_changed: self.extent != previous_extent,
        }
    }

    #[must_use]
    pub fn get(&self, id: SeriesId) -> Option<&Series> {
        self.loaded.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: SeriesId) -> bool {
        self.loaded.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SeriesId> + '_ {
        self.loaded.keys().copied()
    }

    #[must_use]
    pub fn extent(&self) -> Option<DataExtent> {
        self.extent
    }

    #[must_use]
    pub fn selection(&self) -> &IndexSet<SeriesId> {
        &self.selection
    }

    #[must_use]
    pub fn shown(&self) -> &IndexSet<SeriesId> {
        &self.shown
    }

    #[must_use]
    pub fn hidden(&self) -> &IndexSet<SeriesId> {
        &self.hidden
    }

    #[must_use]
    pub fn highlighted(&self) -> &IndexSet<SeriesId> {
        &self.highlighted
    }

    /// Series that can be picked in `mode`: erased series in include mode,
    /// shown series otherwise.
    #[must_use]
    pub fn active_set(&self, mode: InteractionMode) -> &IndexSet<SeriesId> {
        match mode {
            InteractionMode::Include => &self.hidden,
            InteractionMode::Zoom | InteractionMode::Erase => &self.shown,
        }
    }

    #[must_use]
    pub fn membership(&self, id: SeriesId) -> Option<Membership> {
        if self.shown.contains(&id) {
            Some(Membership::Shown)
        } else if self.hidden.contains(&id) {
            Some(Membership::Hidden)
        } else {
            None
        }
    }

    /// Makes `shown` exactly the loaded ids of `ids` (in request order) and
    /// moves every other loaded id to `hidden`. Ids not loaded yet are
    /// remembered and join `shown` when they arrive.
    pub fn set_selection(&mut self, ids: &[SeriesId]) {
        self.selection = ids.iter().copied().collect();
        self.shown = self
            .selection
            .iter()
            .copied()
            .filter(|id| self.loaded.contains_key(id))
            .collect();
        self.hidden = self
            .loaded
            .keys()
            .copied()
            .filter(|id| !self.shown.contains(id))
            .collect();
        debug!(
            requested = ids.len(),
            shown = self.shown.len(),
            hidden = self.hidden.len(),
            "selection updated"
        );
    }

    /// Moves `id` from `shown` to `hidden`. Returns `false` (no-op) when it
    /// is not currently shown.
    pub fn erase(&mut self, id: SeriesId) -> bool {
        if !self.shown.shift_remove(&id) {
            return false;
        }
        self.hidden.insert(id);
        true
    }

    /// Moves `id` from `hidden` to `shown`. Returns `false` (no-op) when it
    /// is not currently hidden.
    pub fn include(&mut self, id: SeriesId) -> bool {
        if !self.hidden.shift_remove(&id) {
            return false;
        }
        self.shown.insert(id);
        true
    }

    /// Replaces the highlighted set; unknown ids are dropped. `None` clears.
    pub fn set_highlight(&mut self, ids: Option<&[SeriesId]>) {
        self.highlighted = ids
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|id| self.loaded.contains_key(id))
            .collect();
    }

    /// Drops every series and working set (full dataset reload).
    pub fn clear(&mut self) {
        self.loaded.clear();
        self.selection.clear();
        self.shown.clear();
        self.hidden.clear();
        self.highlighted.clear();
        self.extent = None;
    }
}
