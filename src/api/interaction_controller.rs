use tracing::{debug, trace};

use crate::core::{SeriesId, ViewTransform};
use crate::error::ChartResult;
use crate::extensions::ChartEvent;
use crate::interaction::{InteractionMode, PointerInfo};
use crate::render::RasterSurface;

use super::LineChart;

impl<S: RasterSurface> LineChart<S> {
    /// Switches between zoom, erase and include. The identity layer is
    /// repainted (debounced) with the series pickable in the new mode.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.interaction.mode() == mode {
            return;
        }
        self.interaction.set_mode(mode);
        self.interaction.update_hovered(None);
        debug!(%mode, "interaction mode changed");
        self.request_identity_redraw();
    }

    /// Pointer moved to `(x, y)`. In zoom mode a `MouseOver` event is emitted
    /// whenever the series under the pointer changes.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<SeriesId> {
        let pointer = PointerInfo::new(x, y);
        self.interaction.set_last_pointer(Some(pointer));
        if self.interaction.mode() != InteractionMode::Zoom {
            return None;
        }
        self.update_hover(pointer)
    }

    /// Pointer left the chart; a hovered series, if any, is released.
    pub fn pointer_leave(&mut self) {
        let pointer = self.interaction.last_pointer();
        self.interaction.set_last_pointer(None);
        let released = self.interaction.update_hovered(None);
        if let (true, Some(pointer)) = (released, pointer) {
            self.emit(ChartEvent::MouseOver { id: None, pointer });
        }
    }

    /// Click at `(x, y)`. In zoom mode emits `Click` with the series under
    /// the pointer (`None` over blank space).
    pub fn pointer_click(&mut self, x: f64, y: f64) -> Option<SeriesId> {
        if self.interaction.mode() != InteractionMode::Zoom {
            return None;
        }
        let pointer = PointerInfo::new(x, y);
        let id = self.find_series_at(x, y);
        self.emit(ChartEvent::Click { id, pointer });
        id
    }

    /// A drag gesture passed over `(x, y)`. In erase mode a shown series
    /// under the pointer yields `Erase`; in include mode a hidden one yields
    /// `Include`. The chart itself does not move the series.
    pub fn drag(&mut self, x: f64, y: f64) -> Option<SeriesId> {
        let mode = self.interaction.mode();
        if mode == InteractionMode::Zoom {
            return None;
        }
        let id = self.find_series_at(x, y)?;
        trace!(%mode, series = %id, "drag hit");
        self.emit(match mode {
            InteractionMode::Include => ChartEvent::Include { id },
            InteractionMode::Erase | InteractionMode::Zoom => ChartEvent::Erase { id },
        });
        Some(id)
    }

    /// Applies a pan/zoom transform to the display mapping (zoom mode only)
    /// and redraws the display layers. The identity raster is left alone.
    ///
    /// Returns `false` when ignored because another mode is active.
    pub fn zoom(&mut self, transform: ViewTransform) -> ChartResult<bool> {
        if self.interaction.mode() != InteractionMode::Zoom {
            return Ok(false);
        }
        let applied = self.mapper.zoom_to(transform)?;
        trace!(x = applied.x, y = applied.y, k = applied.k, "zoom applied");
        self.redraw();
        if let Some(pointer) = self.interaction.last_pointer() {
            self.update_hover(pointer);
        }
        Ok(true)
    }

    /// Returns to the unzoomed view.
    pub fn reset_zoom(&mut self) -> ChartResult<bool> {
        self.zoom(ViewTransform::identity())
    }

    fn update_hover(&mut self, pointer: PointerInfo) -> Option<SeriesId> {
        let id = self.find_series_at(pointer.x, pointer.y);
        if self.interaction.update_hovered(id) {
            self.emit(ChartEvent::MouseOver { id, pointer });
        }
        id
    }
}
