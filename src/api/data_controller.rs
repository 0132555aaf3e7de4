use tracing::{debug, trace, warn};

use crate::core::{Membership, Series, SeriesId};
use crate::data::{DataSource, FetchRequest, FetchTicket, LoadOutcome, TextFetcher};
use crate::error::ChartResult;
use crate::extensions::ChartEvent;
use crate::render::{ColorMode, LayerKind, RasterSurface};

use super::LineChart;

impl<S: RasterSurface> LineChart<S> {
    /// Starts loading `ids` and returns the files the host must fetch.
    ///
    /// Ids already loaded or loading are skipped. Ids the source has no data
    /// for are reported as failed loads right away. Completions go to
    /// [`complete_fetch`](Self::complete_fetch) in any order.
    pub fn load_data<D>(&mut self, ids: &[SeriesId], source: &D) -> Vec<FetchRequest>
    where
        D: DataSource + ?Sized,
    {
        let mut requests = Vec::new();
        for &id in ids {
            if self.store.contains(id) || self.loader.is_pending(id) {
                trace!(series = %id, "series already loaded or loading");
                continue;
            }
            let started = match source.resolve(id) {
                Some(specs) => self.loader.begin(id, specs),
                None => {
                    self.loader.reject(id);
                    self.emit(ChartEvent::SeriesLoaded { id, success: false });
                    continue;
                }
            };
            match started {
                Ok(mut batch) => requests.append(&mut batch),
                Err(err) => {
                    warn!(series = %id, error = %err, "series cannot be loaded");
                    self.loader.reject(id);
                    self.emit(ChartEvent::SeriesLoaded { id, success: false });
                }
            }
        }
        debug!(requested = ids.len(), fetches = requests.len(), "load requested");
        requests
    }

    /// Loads `ids` synchronously through `fetcher`.
    pub fn load_data_with<D, F>(
        &mut self,
        ids: &[SeriesId],
        source: &D,
        fetcher: &mut F,
    ) -> ChartResult<()>
    where
        D: DataSource + ?Sized,
        F: TextFetcher + ?Sized,
    {
        for request in self.load_data(ids, source) {
            let text = fetcher.fetch_text(&request.file);
            self.complete_fetch(request.ticket, text)?;
        }
        Ok(())
    }

    /// Hands back the result of one fetch. `Err` carries the transport error
    /// text. Fails only for tickets this chart did not issue (or issued
    /// before [`clear_data`](Self::clear_data)).
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<String, String>,
    ) -> ChartResult<()> {
        match self.loader.complete(ticket, result)? {
            LoadOutcome::Pending => {}
            LoadOutcome::Failed { id, reason } => {
                warn!(series = %id, %reason, "series load failed");
                self.emit(ChartEvent::SeriesLoaded { id, success: false });
            }
            LoadOutcome::Loaded(series) => {
                let id = series.id();
                self.insert_loaded(series)?;
                self.emit(ChartEvent::SeriesLoaded { id, success: true });
            }
        }
        Ok(())
    }

    fn insert_loaded(&mut self, series: Series) -> ChartResult<()> {
        let id = series.id();
        let inserted = self.store.insert(series);
        debug!(series = %id, membership = ?inserted.membership, "series loaded");

        if inserted.extent_changed {
            if let Some(extent) = self.store.extent() {
                self.mapper.set_extent(extent)?;
            }
            self.redraw();
            self.redraw_identity_now();
            return Ok(());
        }

        let layer = match inserted.membership {
            Membership::Shown => LayerKind::Shown,
            Membership::Hidden => LayerKind::Hidden,
        };
        let base = ColorMode::Base(self.config.base_line_color);
        self.scheduler.append(layer, id, base, &self.compositor);
        if self.store.active_set(self.interaction.mode()).contains(&id) {
            self.scheduler
                .append(LayerKind::Identity, id, ColorMode::Identity, &self.compositor);
        }
        Ok(())
    }

    /// Shows exactly `ids` and hides every other loaded series. Ids still
    /// loading are shown once they arrive.
    pub fn set_selection(&mut self, ids: &[SeriesId]) {
        self.store.set_selection(ids);
        self.redraw();
        self.request_identity_redraw();
    }

    /// Moves a shown series to the hidden set. Returns `false` when it was
    /// not shown.
    pub fn erase_data(&mut self, id: SeriesId) -> bool {
        if !self.store.erase(id) {
            return false;
        }
        debug!(series = %id, "series erased");
        self.redraw();
        self.request_identity_redraw();
        true
    }

    /// Moves a hidden series back to the shown set. Returns `false` when it
    /// was not hidden.
    pub fn include_data(&mut self, id: SeriesId) -> bool {
        if !self.store.include(id) {
            return false;
        }
        debug!(series = %id, "series included");
        self.redraw();
        self.request_identity_redraw();
        true
    }

    /// Replaces the highlighted series and repaints the highlight layer at
    /// once. `None` or an empty list clears it.
    pub fn set_highlight(&mut self, ids: Option<&[SeriesId]>) {
        self.store.set_highlight(ids);
        self.repaint_highlight();
    }

    /// Drops all series, outstanding fetches and layer content.
    pub fn clear_data(&mut self) {
        self.store.clear();
        self.loader.clear();
        self.scheduler.reset();
        self.interaction.update_hovered(None);
        for layer in LayerKind::ALL {
            let mode = match layer {
                LayerKind::Identity => ColorMode::Identity,
                _ => ColorMode::Base(self.config.base_line_color),
            };
            self.scheduler
                .request_redraw(layer, Vec::new(), mode, &mut self.compositor);
        }
        debug!("chart data cleared");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::api::{LineChart, LineChartConfig, ManualClock};
    use crate::core::{SeriesId, Viewport};
    use crate::data::{DataSetSpec, Delimiter};
    use crate::extensions::{ChartEvent, EventQueue};
    use crate::render::{LayerKind, RecordingSurface};

    fn chart() -> (LineChart<RecordingSurface>, ManualClock, EventQueue) {
        let clock = ManualClock::new();
        let config = LineChartConfig::new(Viewport::new(100, 80))
            .with_identity_size(Viewport::new(200, 200));
        let mut chart =
            LineChart::with_clock(config, Box::new(clock.clone())).expect("chart");
        let events = EventQueue::new("events");
        chart.register_observer(Box::new(events.clone())).expect("observer");
        (chart, clock, events)
    }

    fn fixed(text: &'static str) -> impl FnMut(&str) -> Result<String, String> {
        move |_| Ok(text.to_owned())
    }

    fn source(id: SeriesId) -> Option<Vec<DataSetSpec>> {
        (id.raw() < 10).then(|| {
            vec![DataSetSpec::new(format!("{id}.csv")).with_delimiter(Delimiter::Comma)]
        })
    }

    #[test]
    fn completions_in_any_order_fill_the_store() {
        let (mut chart, _clock, events) = chart();
        let requests = chart.load_data(&[SeriesId::new(0), SeriesId::new(1)], &source);
        assert_eq!(requests.len(), 2);
        assert!(chart.is_loading());

        chart
            .complete_fetch(requests[1].ticket, Ok("0,1\n1,0\n".to_owned()))
            .expect("complete");
        chart
            .complete_fetch(requests[0].ticket, Ok("0,0\n1,1\n".to_owned()))
            .expect("complete");

        assert_eq!(chart.store().len(), 2);
        assert_eq!(chart.store().hidden().len(), 2);
        let report = chart.tick();
        assert!(!report.loading);
        assert_eq!(report.progress.loaded, 2);

        let events = events.drain();
        assert!(events.contains(&ChartEvent::SeriesLoaded {
            id: SeriesId::new(1),
            success: true
        }));
        assert_eq!(
            events.last(),
            Some(&ChartEvent::LoadFinished {
                loaded: 2,
                failed: 0
            })
        );
    }

    #[test]
    fn missing_data_and_fetch_errors_fail_only_their_id() {
        let (mut chart, _clock, events) = chart();
        let ids = [SeriesId::new(42), SeriesId::new(2), SeriesId::new(3)];
        let requests = chart.load_data(&ids, &source);
        assert_eq!(requests.len(), 2);
        chart
            .complete_fetch(requests[0].ticket, Err("404".to_owned()))
            .expect("complete");
        chart
            .complete_fetch(requests[1].ticket, Ok("5,5\n6,6\n".to_owned()))
            .expect("complete");

        assert!(chart.store().contains(SeriesId::new(3)));
        assert!(!chart.store().contains(SeriesId::new(2)));
        assert_eq!(chart.store().membership(SeriesId::new(2)), None);

        let failed = events
            .drain()
            .into_iter()
            .filter(|event| matches!(event, ChartEvent::SeriesLoaded { success: false, .. }))
            .count();
        assert_eq!(failed, 2);
        assert_eq!(chart.load_progress().failed, 2);
    }

    #[test]
    fn selected_series_loaded_later_is_shown_and_painted() {
        let (mut chart, clock, _events) = chart();
        chart.set_selection(&[SeriesId::new(1)]);
        chart
            .load_data_with(&[SeriesId::new(0)], &source, &mut fixed("0,0\n4,4\n"))
            .expect("load");
        while chart.tick().drawing {
            clock.advance(Duration::from_millis(16));
        }

        chart
            .load_data_with(&[SeriesId::new(1)], &source, &mut fixed("1,1\n2,2\n"))
            .expect("load");
        assert_eq!(chart.store().shown().iter().copied().collect::<Vec<_>>(), [SeriesId::new(1)]);
        while chart.tick().drawing {
            clock.advance(Duration::from_millis(16));
        }

        let shown = chart.surface(LayerKind::Shown);
        assert_eq!(shown.polylines_since_clear().count(), 1);
        assert_eq!(chart.surface(LayerKind::Identity).polylines_since_clear().count(), 1);
        assert_eq!(chart.surface(LayerKind::Hidden).polylines_since_clear().count(), 1);
    }

    #[test]
    fn erase_and_include_are_noops_outside_their_source_set() {
        let (mut chart, _clock, _events) = chart();
        chart
            .load_data_with(&[SeriesId::new(0)], &source, &mut fixed("0,0\n1,1\n"))
            .expect("load");
        assert!(!chart.erase_data(SeriesId::new(0)));
        assert!(chart.include_data(SeriesId::new(0)));
        assert!(!chart.include_data(SeriesId::new(0)));
        assert!(chart.erase_data(SeriesId::new(0)));
    }

    #[test]
    fn clear_data_forgets_series_and_tickets() {
        let (mut chart, _clock, _events) = chart();
        let requests = chart.load_data(&[SeriesId::new(5)], &source);
        chart.clear_data();
        assert!(chart.complete_fetch(requests[0].ticket, Ok("0,0\n".to_owned())).is_err());
        assert!(chart.store().is_empty());
        assert!(!chart.is_loading());
    }
}
