use tracing::{trace, warn};

use crate::core::{CoordinateMapper, Series, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::identity::encode_id;
use crate::render::{Color, LayerKind, LayerStyle, LayerStyles, RasterSurface, StrokeStyle};

/// Monotonic stamp of a layer's content. Every clear starts a new generation;
/// writes carrying an older stamp are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// How a series is colored when painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMode {
    /// Shared base color, overridden by a trace's background color.
    Base(Color),
    /// Each trace's own color, or `fallback` when it has none.
    TraceColor { fallback: Color },
    /// Encoded flat id color through the identity mapping.
    Identity,
}

#[derive(Debug)]
struct Layer<S> {
    surface: S,
    style: LayerStyle,
    generation: Generation,
}

/// Fixed stack of independently painted raster layers.
#[derive(Debug)]
pub struct Compositor<S: RasterSurface> {
    layers: [Layer<S>; 4],
}

impl<S: RasterSurface> Compositor<S> {
    pub fn new(display: Viewport, identity: Viewport, styles: LayerStyles) -> ChartResult<Self> {
        let [hidden, shown, highlight, id_layer] = LayerKind::ALL.map(|kind| {
            let size = if kind.is_visible() { display } else { identity };
            let mut surface = S::with_size(size)?;
            surface.set_antialias(kind.is_visible());
            Ok::<_, ChartError>(Layer {
                surface,
                style: styles.get(kind),
                generation: Generation::default(),
            })
        });
        Ok(Self {
            layers: [hidden?, shown?, highlight?, id_layer?],
        })
    }

    #[must_use]
    pub fn surface(&self, layer: LayerKind) -> &S {
        &self.layers[layer.index()].surface
    }

    #[must_use]
    pub fn style(&self, layer: LayerKind) -> LayerStyle {
        self.layers[layer.index()].style
    }

    #[must_use]
    pub fn generation(&self, layer: LayerKind) -> Generation {
        self.layers[layer.index()].generation
    }

    #[must_use]
    pub fn is_current(&self, layer: LayerKind, generation: Generation) -> bool {
        self.generation(layer) == generation
    }

    /// Resizes every visible layer. Their content is dropped, so in-flight
    /// redraws of those layers become stale.
    pub fn resize_display(&mut self, size: Viewport) -> ChartResult<()> {
        for kind in LayerKind::ALL.into_iter().filter(|kind| kind.is_visible()) {
            let layer = &mut self.layers[kind.index()];
            layer.generation = layer.generation.next();
            layer.surface.resize(size)?;
        }
        Ok(())
    }

    /// Clears `layer` synchronously and starts a new generation.
    pub fn begin_redraw(&mut self, layer: LayerKind) -> Generation {
        let entry = &mut self.layers[layer.index()];
        entry.surface.clear();
        entry.generation = entry.generation.next();
        trace!(?layer, generation = entry.generation.raw(), "layer cleared");
        entry.generation
    }

    /// Strokes every trace of `series` onto `layer`.
    ///
    /// Returns `Ok(false)` without writing when `generation` is no longer the
    /// layer's current generation.
    pub fn paint_series(
        &mut self,
        layer: LayerKind,
        generation: Generation,
        series: &Series,
        mode: ColorMode,
        mapper: &CoordinateMapper,
    ) -> ChartResult<bool> {
        if !self.is_current(layer, generation) {
            return Ok(false);
        }

        let entry = &mut self.layers[layer.index()];
        let style = entry.style;
        match mode {
            ColorMode::Identity => {
                let color = Color::from_rgba8(encode_id(series.id())?);
                let stroke = StrokeStyle::new(color, style.stroke_width);
                for trace in series.traces() {
                    let points = mapper.project_identity_points(&trace.points);
                    entry.surface.draw_polyline(&points, stroke)?;
                }
            }
            ColorMode::Base(base) => {
                for trace in series.traces() {
                    let color = trace.background_color.unwrap_or(base);
                    let stroke =
                        StrokeStyle::new(color.with_alpha_factor(style.alpha), style.stroke_width);
                    let points = mapper.project_display_points(&trace.points);
                    entry.surface.draw_polyline(&points, stroke)?;
                }
            }
            ColorMode::TraceColor { fallback } => {
                for trace in series.traces() {
                    let color = trace.color.unwrap_or(fallback);
                    let stroke =
                        StrokeStyle::new(color.with_alpha_factor(style.alpha), style.stroke_width);
                    let points = mapper.project_display_points(&trace.points);
                    entry.surface.draw_polyline(&points, stroke)?;
                }
            }
        }
        Ok(true)
    }

    /// Clears `layer` and paints `series` immediately, bypassing the
    /// scheduler. Series that cannot be painted are skipped with a warning.
    pub fn repaint_now<'a>(
        &mut self,
        layer: LayerKind,
        series: impl IntoIterator<Item = &'a Series>,
        mode: ColorMode,
        mapper: &CoordinateMapper,
    ) -> Generation {
        let generation = self.begin_redraw(layer);
        for entry in series {
            if let Err(err) = self.paint_series(layer, generation, entry, mode, mapper) {
                warn!(?layer, series = %entry.id(), error = %err, "skipping unpaintable series");
            }
        }
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorMode, Compositor};
    use crate::core::{
        CoordinateMapper, DataExtent, DataPoint, ScaleExtent, Series, SeriesId, Trace, Viewport,
    };
    use crate::render::identity::decode_pixel;
    use crate::render::{
        Color, LayerKind, LayerStyles, PixelBuffer, RasterSurface, RecordingSurface, Rgba8,
    };

    fn mapper() -> CoordinateMapper {
        let mut mapper = CoordinateMapper::new(
            Viewport::new(100, 100),
            Viewport::new(200, 200),
            ScaleExtent::default(),
        )
        .expect("mapper");
        mapper
            .set_extent(
                DataExtent::from_points(&[DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)])
                    .expect("extent"),
            )
            .expect("extent");
        mapper
    }

    fn diagonal(raw: u32) -> Series {
        Series::from_points(
            SeriesId::new(raw),
            vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)],
        )
        .expect("series")
    }

    fn compositor<S: RasterSurface>() -> Compositor<S> {
        Compositor::new(Viewport::new(100, 100), Viewport::new(200, 200), LayerStyles::default())
            .expect("compositor")
    }

    #[test]
    fn identity_layer_uses_identity_size_and_encoded_color() {
        let mapper = mapper();
        let mut compositor: Compositor<PixelBuffer> = compositor();
        assert_eq!(compositor.surface(LayerKind::Identity).size(), Viewport::new(200, 200));
        assert_eq!(compositor.surface(LayerKind::Shown).size(), Viewport::new(100, 100));

        let generation = compositor.begin_redraw(LayerKind::Identity);
        let painted = compositor
            .paint_series(
                LayerKind::Identity,
                generation,
                &diagonal(41),
                ColorMode::Identity,
                &mapper,
            )
            .expect("paint");
        assert!(painted);

        let center = compositor
            .surface(LayerKind::Identity)
            .pixel(100, 99)
            .expect("in bounds");
        assert_eq!(decode_pixel(center), Some(SeriesId::new(41)));
    }

    #[test]
    fn stale_generation_does_not_write() {
        let mapper = mapper();
        let mut compositor: Compositor<RecordingSurface> = compositor();

        let stale = compositor.begin_redraw(LayerKind::Shown);
        let fresh = compositor.begin_redraw(LayerKind::Shown);
        assert!(fresh > stale);

        let written = compositor
            .paint_series(
                LayerKind::Shown,
                stale,
                &diagonal(1),
                ColorMode::Base(Color::GREY),
                &mapper,
            )
            .expect("paint");
        assert!(!written);
        assert_eq!(compositor.surface(LayerKind::Shown).polylines_since_clear().count(), 0);
    }

    #[test]
    fn base_color_is_overridden_by_background_color_and_layer_alpha() {
        let mapper = mapper();
        let mut compositor: Compositor<RecordingSurface> = compositor();
        let series = Series::new(
            SeriesId::new(2),
            [
                Trace::new(vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 0.5)]),
                Trace::new(vec![DataPoint::new(0.0, 1.0), DataPoint::new(1.0, 0.5)])
                    .with_background_color(Some(Color::rgb(1.0, 0.0, 0.0))),
            ],
        )
        .expect("series");

        compositor.repaint_now(LayerKind::Hidden, [&series], ColorMode::Base(Color::GREY), &mapper);
        let strokes: Vec<_> = compositor
            .surface(LayerKind::Hidden)
            .polylines_since_clear()
            .map(|(_, style)| style)
            .collect();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].color, Color::GREY.with_alpha_factor(0.5));
        assert_eq!(strokes[1].color.to_rgba8(), Rgba8::new(255, 0, 0, 128));
    }

    #[test]
    fn resize_invalidates_visible_layers_only() {
        let mut compositor: Compositor<RecordingSurface> = compositor();
        let shown = compositor.generation(LayerKind::Shown);
        let identity = compositor.generation(LayerKind::Identity);

        compositor.resize_display(Viewport::new(300, 150)).expect("resize");
        assert!(!compositor.is_current(LayerKind::Shown, shown));
        assert!(compositor.is_current(LayerKind::Identity, identity));
        assert_eq!(compositor.surface(LayerKind::Highlight).size(), Viewport::new(300, 150));
        assert_eq!(compositor.surface(LayerKind::Identity).size(), Viewport::new(200, 200));
    }
}
