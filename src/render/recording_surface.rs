use crate::core::{PixelPoint, Viewport};
use crate::error::ChartResult;
use crate::render::{PixelRect, RasterSurface, Rgba8, StrokeStyle};

/// One call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Clear,
    Polyline {
        points: Vec<PixelPoint>,
        style: StrokeStyle,
    },
}

/// Surface that records draw calls instead of rasterizing.
///
/// It still validates strokes so tests catch invalid styles, and samples as
/// fully transparent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    size: Option<Viewport>,
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Strokes issued after the most recent clear.
    pub fn polylines_since_clear(&self) -> impl Iterator<Item = (&[PixelPoint], StrokeStyle)> {
        let start = self
            .commands
            .iter()
            .rposition(|command| matches!(command, SurfaceCommand::Clear))
            .map_or(0, |index| index + 1);
        self.commands[start..]
            .iter()
            .filter_map(|command| match command {
                SurfaceCommand::Polyline { points, style } => Some((points.as_slice(), *style)),
                SurfaceCommand::Clear => None,
            })
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, SurfaceCommand::Clear))
            .count()
    }
}

impl RasterSurface for RecordingSurface {
    fn with_size(size: Viewport) -> ChartResult<Self> {
        Ok(Self {
            size: Some(size),
            commands: Vec::new(),
        })
    }

    fn size(&self) -> Viewport {
        self.size.unwrap_or(Viewport::new(0, 0))
    }

    fn resize(&mut self, size: Viewport) -> ChartResult<()> {
        self.size = Some(size);
        self.commands.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.commands.push(SurfaceCommand::Clear);
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], style: StrokeStyle) -> ChartResult<()> {
        style.validate()?;
        self.commands.push(SurfaceCommand::Polyline {
            points: points.to_vec(),
            style,
        });
        Ok(())
    }

    fn sample(&self, rect: PixelRect) -> Vec<Rgba8> {
        vec![Rgba8::TRANSPARENT; rect.area()]
    }
}
