use cairo::{Antialias, Context, Format, ImageSurface, LineCap, LineJoin, Operator};
use tracing::warn;

use crate::core::{PixelPoint, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, PixelRect, RasterSurface, Rgba8, StrokeStyle};

/// Layer raster backed by a Cairo ARGB32 image surface.
///
/// Strokes use round caps and joins. With anti-aliasing off a pixel is
/// either untouched or holds the stroke color exactly, which the identity
/// layer relies on.
#[derive(Debug)]
pub struct CairoSurface {
    surface: ImageSurface,
    size: Viewport,
    antialias: Antialias,
}

impl CairoSurface {
    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo"
    }

    fn context(&self) -> ChartResult<Context> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        context.set_antialias(self.antialias);
        Ok(context)
    }
}

impl RasterSurface for CairoSurface {
    fn with_size(size: Viewport) -> ChartResult<Self> {
        Ok(Self {
            surface: create_surface(size)?,
            size,
            antialias: Antialias::Default,
        })
    }

    fn size(&self) -> Viewport {
        self.size
    }

    fn resize(&mut self, size: Viewport) -> ChartResult<()> {
        self.surface = create_surface(size)?;
        self.size = size;
        Ok(())
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.antialias = if enabled {
            Antialias::Default
        } else {
            Antialias::None
        };
    }

    fn clear(&mut self) {
        let cleared = self.context().and_then(|context| {
            context.set_operator(Operator::Clear);
            context
                .paint()
                .map_err(|err| map_backend_error("failed to clear surface", err))
        });
        if let Err(err) = cleared {
            warn!(error = %err, "cairo surface not cleared");
        }
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], style: StrokeStyle) -> ChartResult<()> {
        style.validate()?;
        if points.is_empty() || style.color.alpha == 0.0 {
            return Ok(());
        }

        let context = self.context()?;
        apply_color(&context, style.color);
        context.set_line_width(style.width);
        context.set_line_cap(LineCap::Round);
        context.set_line_join(LineJoin::Round);
        for run in points.split(|point| !point.is_finite()) {
            let Some((first, rest)) = run.split_first() else {
                continue;
            };
            if rest.is_empty() && points.len() > 1 {
                continue;
            }
            context.move_to(first.x, first.y);
            if rest.is_empty() {
                context.line_to(first.x, first.y);
            }
            for point in rest {
                context.line_to(point.x, point.y);
            }
        }
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke polyline", err))
    }

    fn sample(&self, rect: PixelRect) -> Vec<Rgba8> {
        let mut samples = vec![Rgba8::TRANSPARENT; rect.area()];
        if samples.is_empty() {
            return samples;
        }
        let (width, height) = (i64::from(self.size.width), i64::from(self.size.height));
        let columns = i64::from(rect.width);
        let stride = self.surface.stride().max(0) as usize;

        let read = self.surface.with_data(|data| {
            for (index, slot) in samples.iter_mut().enumerate() {
                let x = rect.x.saturating_add(index as i64 % columns);
                let y = rect.y.saturating_add(index as i64 / columns);
                if x < 0 || y < 0 || x >= width || y >= height {
                    continue;
                }
                let offset = y as usize * stride + x as usize * 4;
                if let Some(&[b0, b1, b2, b3]) = data.get(offset..offset + 4) {
                    *slot = unpremultiply(u32::from_ne_bytes([b0, b1, b2, b3]));
                }
            }
        });
        if let Err(err) = read {
            warn!(error = %err, "cairo surface data unavailable");
        }
        samples
    }
}

fn create_surface(size: Viewport) -> ChartResult<ImageSurface> {
    let invalid = || ChartError::InvalidViewport {
        width: size.width,
        height: size.height,
    };
    let width = i32::try_from(size.width).map_err(|_| invalid())?;
    let height = i32::try_from(size.height).map_err(|_| invalid())?;
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

/// ARGB32 pixels are native-endian words with premultiplied color.
fn unpremultiply(argb: u32) -> Rgba8 {
    let alpha = (argb >> 24) & 0xff;
    if alpha == 0 {
        return Rgba8::TRANSPARENT;
    }
    let channel = |shift: u32| {
        let value = (argb >> shift) & 0xff;
        ((value * 255 + alpha / 2) / alpha).min(255) as u8
    };
    Rgba8::new(channel(16), channel(8), channel(0), alpha as u8)
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
