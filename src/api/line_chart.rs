use tracing::debug;

use crate::core::{CoordinateMapper, PixelPoint, SeriesId, SeriesStore, Viewport};
use crate::data::{LoadProgress, LoadTracker};
use crate::error::ChartResult;
use crate::extensions::{ChartEvent, ChartObserver, ObserverRegistry};
use crate::interaction::{HitTester, InteractionMode, InteractionState};
use crate::render::{ColorMode, Compositor, LayerKind, RasterSurface};

use super::{Clock, LineChartConfig, MonotonicClock, RedrawScheduler};

/// What one [`LineChart::tick`] did and what is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Some layer is still mid-redraw (or an identity repaint is pending).
    pub drawing: bool,
    /// Some fetch of the current load batch is outstanding.
    pub loading: bool,
    pub painted: usize,
    pub superseded: usize,
    pub progress: LoadProgress,
}

/// Layered line chart with color-keyed picking.
///
/// `LineChart` owns the series store, both coordinate mappings, the four
/// raster layers and their redraw scheduler. The host drives it by calling
/// [`tick`](Self::tick) from its frame loop and feeding pointer input and
/// fetch completions; results come back through registered observers.
pub struct LineChart<S: RasterSurface> {
    pub(super) config: LineChartConfig,
    pub(super) store: SeriesStore,
    pub(super) mapper: CoordinateMapper,
    pub(super) compositor: Compositor<S>,
    pub(super) scheduler: RedrawScheduler,
    pub(super) loader: LoadTracker,
    pub(super) hit_tester: HitTester,
    pub(super) interaction: InteractionState,
    pub(super) observers: ObserverRegistry,
    pub(super) clock: Box<dyn Clock>,
}

impl<S: RasterSurface> std::fmt::Debug for LineChart<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChart")
            .field("viewport", &self.mapper.viewport())
            .field("loaded", &self.store.len())
            .field("mode", &self.interaction.mode())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl<S: RasterSurface> LineChart<S> {
    pub fn new(config: LineChartConfig) -> ChartResult<Self> {
        Self::with_clock(config, Box::new(MonotonicClock::default()))
    }

    pub fn with_clock(config: LineChartConfig, clock: Box<dyn Clock>) -> ChartResult<Self> {
        config.validate()?;
        let mapper =
            CoordinateMapper::new(config.viewport, config.identity_size, config.scale_extent)?;
        let mut interaction = InteractionState::default();
        interaction.set_mode(config.initial_mode);
        debug!(
            width = config.viewport.width,
            height = config.viewport.height,
            "line chart created"
        );
        Ok(Self {
            compositor: Compositor::new(
                config.viewport,
                config.identity_size,
                config.layer_styles,
            )?,
            scheduler: RedrawScheduler::new(config.budgets, config.identity_debounce()),
            loader: LoadTracker::default(),
            hit_tester: HitTester::new(config.hit_test),
            store: SeriesStore::new(),
            observers: ObserverRegistry::default(),
            interaction,
            mapper,
            config,
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &LineChartConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    #[must_use]
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    #[must_use]
    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn compositor(&self) -> &Compositor<S> {
        &self.compositor
    }

    #[must_use]
    pub fn surface(&self, layer: LayerKind) -> &S {
        self.compositor.surface(layer)
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.mapper.viewport()
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<SeriesId> {
        self.interaction.hovered()
    }

    #[must_use]
    pub fn load_progress(&self) -> LoadProgress {
        self.loader.progress()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn register_observer(&mut self, observer: Box<dyn ChartObserver>) -> ChartResult<()> {
        self.observers.register(observer)
    }

    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        self.observers.unregister(observer_id)
    }

    /// Advances every running redraw by one budgeted step. Call once per
    /// host frame.
    pub fn tick(&mut self) -> TickReport {
        let summary = self.scheduler.tick(
            &mut self.compositor,
            &self.store,
            &self.mapper,
            self.clock.as_ref(),
        );
        if let Some(finished) = self.loader.take_finished() {
            debug!(
                loaded = finished.loaded,
                failed = finished.failed,
                "load batch finished"
            );
            self.emit(ChartEvent::LoadFinished {
                loaded: finished.loaded,
                failed: finished.failed,
            });
        }
        TickReport {
            drawing: summary.busy,
            loading: self.loader.is_loading(),
            painted: summary.painted,
            superseded: summary.superseded,
            progress: self.loader.progress(),
        }
    }

    /// Resolves the pickable series under a screen position.
    #[must_use]
    pub fn find_series_at(&self, x: f64, y: f64) -> Option<SeriesId> {
        self.hit_tester.find_series_at(
            PixelPoint::new(x, y),
            &self.mapper,
            self.compositor.surface(LayerKind::Identity),
            self.store.active_set(self.interaction.mode()),
        )
    }

    /// Resizes the display layers and redraws them. The identity raster
    /// keeps its size and content.
    pub fn update_size(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.mapper.update_size(viewport)?;
        self.compositor.resize_display(viewport)?;
        debug!(width = viewport.width, height = viewport.height, "display resized");
        self.redraw();
        Ok(())
    }

    /// Clears and reschedules both display working sets and repaints the
    /// highlight layer.
    pub fn redraw(&mut self) {
        let base = ColorMode::Base(self.config.base_line_color);
        let hidden = self.store.hidden().iter().copied().collect();
        self.scheduler
            .request_redraw(LayerKind::Hidden, hidden, base, &mut self.compositor);
        let shown = self.store.shown().iter().copied().collect();
        self.scheduler
            .request_redraw(LayerKind::Shown, shown, base, &mut self.compositor);
        self.repaint_highlight();
    }

    pub(super) fn repaint_highlight(&mut self) {
        let mode = ColorMode::TraceColor {
            fallback: self.config.highlight_fallback_color,
        };
        let store = &self.store;
        let series = store.highlighted().iter().filter_map(|id| store.get(*id));
        self.compositor
            .repaint_now(LayerKind::Highlight, series, mode, &self.mapper);
    }

    /// Clears the identity layer and schedules its repaint without waiting
    /// for the debounce. Used when the identity mapping itself changed, so no
    /// pixel painted under the old mapping survives a lookup.
    pub(super) fn redraw_identity_now(&mut self) {
        let items = self
            .store
            .active_set(self.interaction.mode())
            .iter()
            .copied()
            .collect();
        self.scheduler.request_redraw(
            LayerKind::Identity,
            items,
            ColorMode::Identity,
            &mut self.compositor,
        );
    }

    /// Debounced repaint of the identity layer with the series pickable in
    /// the current mode.
    pub(super) fn request_identity_redraw(&mut self) {
        let items = self
            .store
            .active_set(self.interaction.mode())
            .iter()
            .copied()
            .collect();
        self.scheduler
            .request_identity_redraw(items, self.clock.now());
    }

    pub(super) fn emit(&mut self, event: ChartEvent) {
        self.observers.dispatch(event);
    }
}
