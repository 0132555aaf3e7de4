use crate::core::{PixelPoint, Viewport};
use crate::error::ChartResult;
use crate::render::{PixelRect, RasterSurface, Rgba8, StrokeStyle};

/// In-memory RGBA raster used for headless rendering and picking.
///
/// Strokes are solid (never anti-aliased): a pixel is covered when its
/// center lies within `width / 2` of the polyline. Each pixel is blended at
/// most once per polyline so joins of translucent strokes do not darken.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
    coverage: Vec<u32>,
    stroke_stamp: u32,
}

impl PixelBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![Rgba8::TRANSPARENT; len],
            coverage: vec![0; len],
            stroke_stamp: 0,
        }
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.index(i64::from(x), i64::from(y))
            .map(|index| self.pixels[index])
    }

    #[must_use]
    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Writes one pixel directly, bypassing stroking. Out-of-bounds writes
    /// are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba8) {
        if let Some(index) = self.index(i64::from(x), i64::from(y)) {
            self.pixels[index] = pixel;
        }
    }

    #[must_use]
    pub fn painted_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|pixel| pixel.a != 0).count()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn next_stamp(&mut self) -> u32 {
        self.stroke_stamp = self.stroke_stamp.wrapping_add(1);
        if self.stroke_stamp == 0 {
            self.coverage.fill(0);
            self.stroke_stamp = 1;
        }
        self.stroke_stamp
    }

    fn stroke_segment(
        &mut self,
        start: PixelPoint,
        end: PixelPoint,
        half_width: f64,
        color: Rgba8,
        stamp: u32,
    ) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let x_from = (start.x.min(end.x) - half_width).floor().clamp(0.0, max_x) as i64;
        let x_to = (start.x.max(end.x) + half_width).ceil().clamp(0.0, max_x) as i64;
        let y_from = (start.y.min(end.y) - half_width).floor().clamp(0.0, max_y) as i64;
        let y_to = (start.y.max(end.y) + half_width).ceil().clamp(0.0, max_y) as i64;
        let reach_sq = half_width * half_width;

        for y in y_from..=y_to {
            for x in x_from..=x_to {
                let center = PixelPoint::new(x as f64 + 0.5, y as f64 + 0.5);
                if distance_sq_to_segment(center, start, end) > reach_sq {
                    continue;
                }
                let Some(index) = self.index(x, y) else {
                    continue;
                };
                if self.coverage[index] == stamp {
                    continue;
                }
                self.coverage[index] = stamp;
                self.pixels[index] = blend_over(color, self.pixels[index]);
            }
        }
    }
}

impl RasterSurface for PixelBuffer {
    fn with_size(size: Viewport) -> ChartResult<Self> {
        Ok(Self::new(size.width, size.height))
    }

    fn size(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    fn resize(&mut self, size: Viewport) -> ChartResult<()> {
        *self = Self::new(size.width, size.height);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba8::TRANSPARENT);
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], style: StrokeStyle) -> ChartResult<()> {
        style.validate()?;
        let color = style.color.to_rgba8();
        if color.a == 0 || points.is_empty() {
            return Ok(());
        }

        let half_width = style.width / 2.0;
        let stamp = self.next_stamp();
        if let [only] = points {
            if only.is_finite() {
                self.stroke_segment(*only, *only, half_width, color, stamp);
            }
            return Ok(());
        }
        for pair in points.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if start.is_finite() && end.is_finite() {
                self.stroke_segment(start, end, half_width, color, stamp);
            }
        }
        Ok(())
    }

    fn sample(&self, rect: PixelRect) -> Vec<Rgba8> {
        let mut samples = Vec::with_capacity(rect.area());
        for dy in 0..i64::from(rect.height) {
            for dx in 0..i64::from(rect.width) {
                let pixel = self
                    .index(rect.x.saturating_add(dx), rect.y.saturating_add(dy))
                    .map_or(Rgba8::TRANSPARENT, |index| self.pixels[index]);
                samples.push(pixel);
            }
        }
        samples
    }
}

fn distance_sq_to_segment(point: PixelPoint, start: PixelPoint, end: PixelPoint) -> f64 {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (nx, ny) = (start.x + t * dx, start.y + t * dy);
    (point.x - nx).powi(2) + (point.y - ny).powi(2)
}

/// Source-over compositing of straight (non-premultiplied) colors.
fn blend_over(src: Rgba8, dst: Rgba8) -> Rgba8 {
    if src.a == 255 || dst.a == 0 {
        return src;
    }
    let src_a = f64::from(src.a) / 255.0;
    let dst_a = f64::from(dst.a) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let mix = |s: u8, d: u8| {
        let value = (f64::from(s) * src_a + f64::from(d) * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba8::new(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
