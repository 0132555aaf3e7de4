use indexmap::IndexSet;
use tracing::debug;

use crate::core::SeriesId;
use crate::extensions::ChartEvent;
use crate::render::RasterSurface;

use super::LineChart;

/// Cross-chart selection state: the clicked series, the series currently
/// hovered in any chart and a set that stays highlighted regardless.
///
/// Events drained from one chart are routed here and fanned out to every
/// chart that shows the same ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCoordinator {
    selected: Option<SeriesId>,
    hovered: Option<SeriesId>,
    always_highlighted: IndexSet<SeriesId>,
}

impl SelectionCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<SeriesId> {
        self.selected
    }

    #[must_use]
    pub fn hovered(&self) -> Option<SeriesId> {
        self.hovered
    }

    #[must_use]
    pub fn always_highlighted(&self) -> &IndexSet<SeriesId> {
        &self.always_highlighted
    }

    pub fn set_always_highlighted(&mut self, ids: &[SeriesId]) {
        self.always_highlighted = ids.iter().copied().collect();
    }

    /// Selected first, then hovered, then the always-highlighted set, with
    /// duplicates removed.
    #[must_use]
    pub fn highlight_list(&self) -> Vec<SeriesId> {
        let mut list = IndexSet::with_capacity(self.always_highlighted.len() + 2);
        list.extend(self.selected);
        list.extend(self.hovered);
        list.extend(self.always_highlighted.iter().copied());
        list.into_iter().collect()
    }

    /// Routes one chart event to every chart.
    ///
    /// Hover and click update the highlight of all charts; erase and include
    /// move the series in all charts. Load events are ignored.
    pub fn dispatch<S: RasterSurface>(
        &mut self,
        event: &ChartEvent,
        charts: &mut [&mut LineChart<S>],
    ) {
        match *event {
            ChartEvent::MouseOver { id, .. } => {
                self.hovered = id;
                self.apply_highlight(charts);
            }
            ChartEvent::Click { id, .. } => {
                debug!(series = ?id, "selected series changed");
                self.selected = id;
                self.hovered = None;
                self.apply_highlight(charts);
            }
            ChartEvent::Erase { id } => {
                for chart in charts.iter_mut() {
                    chart.erase_data(id);
                }
            }
            ChartEvent::Include { id } => {
                for chart in charts.iter_mut() {
                    chart.include_data(id);
                }
            }
            ChartEvent::SeriesLoaded { .. } | ChartEvent::LoadFinished { .. } => {}
        }
    }

    /// Applies one selection to every chart.
    pub fn set_selection<S: RasterSurface>(
        &mut self,
        ids: &[SeriesId],
        charts: &mut [&mut LineChart<S>],
    ) {
        for chart in charts.iter_mut() {
            chart.set_selection(ids);
        }
    }

    /// Forgets the selected and hovered ids and the always-highlighted set,
    /// and clears every chart's highlight.
    pub fn reset<S: RasterSurface>(&mut self, charts: &mut [&mut LineChart<S>]) {
        *self = Self::default();
        self.apply_highlight(charts);
    }

    fn apply_highlight<S: RasterSurface>(&self, charts: &mut [&mut LineChart<S>]) {
        let list = self.highlight_list();
        for chart in charts.iter_mut() {
            chart.set_highlight(Some(&list));
        }
    }
}
