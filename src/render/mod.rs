#[cfg(feature = "cairo-backend")]
mod cairo_surface;
mod compositor;
pub mod identity;
mod layer_stack;
mod pixel_buffer;
mod primitives;
mod recording_surface;

#[cfg(feature = "cairo-backend")]
pub use cairo_surface::CairoSurface;
pub use compositor::{ColorMode, Compositor, Generation};
pub use layer_stack::{LayerKind, LayerStyle, LayerStyles};
pub use pixel_buffer::PixelBuffer;
pub use primitives::{Color, PixelRect, Rgba8, StrokeStyle};
pub use recording_surface::{RecordingSurface, SurfaceCommand};

use crate::core::{PixelPoint, Viewport};
use crate::error::ChartResult;

/// Owned raster resource backing one compositor layer.
///
/// The compositor only clears, strokes and samples; anything that can do
/// those three things (an in-memory buffer, a GPU canvas, a recorder) can
/// back a layer.
pub trait RasterSurface {
    fn with_size(size: Viewport) -> ChartResult<Self>
    where
        Self: Sized;

    fn size(&self) -> Viewport;

    /// Resizes and discards the current content.
    fn resize(&mut self, size: Viewport) -> ChartResult<()>;

    /// Turns edge smoothing on or off. The identity layer turns it off so
    /// every covered pixel holds an exact id color.
    fn set_antialias(&mut self, _enabled: bool) {}

    fn clear(&mut self);

    fn draw_polyline(&mut self, points: &[PixelPoint], style: StrokeStyle) -> ChartResult<()>;

    /// Row-major samples of `rect`; pixels outside the surface are transparent.
    fn sample(&self, rect: PixelRect) -> Vec<Rgba8>;
}
