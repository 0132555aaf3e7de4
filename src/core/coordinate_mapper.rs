use tracing::debug;

use crate::core::{
    DataExtent, DataPoint, LinearScale, PixelPoint, ScaleExtent, ViewTransform, Viewport,
};
use crate::error::{ChartError, ChartResult};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

/// Domain used before any data has been loaded.
const EMPTY_DOMAIN: (f64, f64) = (0.0, 1.0);

/// Display and identity coordinate systems.
///
/// The display pair maps the visible (zoomed) sub-domain onto the viewport.
/// The identity pair always maps the full data domain onto the fixed-size
/// identity raster and never sees the view transform, so picking stays
/// stable while the user pans and zooms.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    viewport: Viewport,
    identity_size: Viewport,
    scale_extent: ScaleExtent,
    extent: Option<DataExtent>,
    transform: ViewTransform,
    base_x: LinearScale,
    base_y: LinearScale,
    display_x: LinearScale,
    display_y: LinearScale,
    identity_x: LinearScale,
    identity_y: LinearScale,
}

impl CoordinateMapper {
    pub fn new(
        viewport: Viewport,
        identity_size: Viewport,
        scale_extent: ScaleExtent,
    ) -> ChartResult<Self> {
        validate_viewport(viewport)?;
        validate_viewport(identity_size)?;

        let (x_domain, y_domain) = (EMPTY_DOMAIN, EMPTY_DOMAIN);
        let base_x = horizontal(x_domain, viewport)?;
        let base_y = vertical(y_domain, viewport)?;
        Ok(Self {
            viewport,
            identity_size,
            scale_extent,
            extent: None,
            transform: ViewTransform::identity(),
            base_x,
            base_y,
            display_x: base_x,
            display_y: base_y,
            identity_x: horizontal(x_domain, identity_size)?,
            identity_y: vertical(y_domain, identity_size)?,
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn identity_size(&self) -> Viewport {
        self.identity_size
    }

    #[must_use]
    pub fn extent(&self) -> Option<DataExtent> {
        self.extent
    }

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Visible `(x, y)` domains of the display mapping.
    #[must_use]
    pub fn display_domain(&self) -> ((f64, f64), (f64, f64)) {
        (self.display_x.domain(), self.display_y.domain())
    }

    /// Full `(x, y)` domains of the identity mapping.
    #[must_use]
    pub fn identity_domain(&self) -> ((f64, f64), (f64, f64)) {
        (self.identity_x.domain(), self.identity_y.domain())
    }

    /// Rebuilds every domain from the accumulated data extent and resets the
    /// view transform. Returns `false` when the extent is unchanged.
    pub fn set_extent(&mut self, extent: DataExtent) -> ChartResult<bool> {
        if self.extent == Some(extent) {
            return Ok(false);
        }

        let (x_domain, y_domain) = (extent.x_domain(), extent.y_domain());
        self.base_x = horizontal(x_domain, self.viewport)?;
        self.base_y = vertical(y_domain, self.viewport)?;
        self.identity_x = horizontal(x_domain, self.identity_size)?;
        self.identity_y = vertical(y_domain, self.identity_size)?;
        self.extent = Some(extent);
        self.transform = ViewTransform::identity();
        self.display_x = self.base_x;
        self.display_y = self.base_y;
        debug!(?x_domain, ?y_domain, "data domain updated");
        Ok(true)
    }

    /// Changes the display raster size. The view transform is re-applied to
    /// the new size; the identity mapping is untouched.
    pub fn update_size(&mut self, viewport: Viewport) -> ChartResult<()> {
        validate_viewport(viewport)?;
        self.viewport = viewport;
        self.base_x = self.base_x.with_range(0.0, viewport.width_f64())?;
        self.base_y = self.base_y.with_range(viewport.height_f64(), 0.0)?;
        self.apply_transform(self.transform)?;
        Ok(())
    }

    /// Applies a pan/zoom transform to the display mapping only and returns
    /// the transform actually applied after constraints.
    pub fn zoom_to(&mut self, transform: ViewTransform) -> ChartResult<ViewTransform> {
        if !transform.is_finite() {
            return Err(ChartError::InvalidData(
                "view transform must be finite".to_owned(),
            ));
        }
        self.apply_transform(transform)
    }

    fn apply_transform(&mut self, transform: ViewTransform) -> ChartResult<ViewTransform> {
        let transform = transform.constrained(self.viewport, self.scale_extent);
        let width = self.viewport.width_f64();
        let height = self.viewport.height_f64();

        let x_start = self.base_x.invert(-transform.x / transform.k);
        let x_end = self.base_x.invert((width - transform.x) / transform.k);
        let y_start = self.base_y.invert((height - transform.y) / transform.k);
        let y_end = self.base_y.invert(-transform.y / transform.k);

        self.display_x = self.base_x.with_domain(x_start, x_end)?;
        self.display_y = self.base_y.with_domain(y_start, y_end)?;
        self.transform = transform;
        Ok(transform)
    }

    #[must_use]
    pub fn project_display(&self, point: DataPoint) -> PixelPoint {
        PixelPoint::new(self.display_x.project(point.x), self.display_y.project(point.y))
    }

    #[must_use]
    pub fn invert_display(&self, pixel: PixelPoint) -> DataPoint {
        DataPoint::new(self.display_x.invert(pixel.x), self.display_y.invert(pixel.y))
    }

    #[must_use]
    pub fn project_identity(&self, point: DataPoint) -> PixelPoint {
        PixelPoint::new(
            self.identity_x.project(point.x),
            self.identity_y.project(point.y),
        )
    }

    #[must_use]
    pub fn invert_identity(&self, pixel: PixelPoint) -> DataPoint {
        DataPoint::new(self.identity_x.invert(pixel.x), self.identity_y.invert(pixel.y))
    }

    /// Screen pixel → data point (display inverse) → identity raster pixel.
    #[must_use]
    pub fn screen_to_identity(&self, screen: PixelPoint) -> PixelPoint {
        self.project_identity(self.invert_display(screen))
    }

    #[must_use]
    pub fn project_display_points(&self, points: &[DataPoint]) -> Vec<PixelPoint> {
        project_all(points, |point| self.project_display(point))
    }

    #[must_use]
    pub fn project_identity_points(&self, points: &[DataPoint]) -> Vec<PixelPoint> {
        project_all(points, |point| self.project_identity(point))
    }
}

#[cfg(not(feature = "parallel-projection"))]
fn project_all(points: &[DataPoint], project: impl Fn(DataPoint) -> PixelPoint) -> Vec<PixelPoint> {
    points.iter().copied().map(project).collect()
}

#[cfg(feature = "parallel-projection")]
fn project_all(
    points: &[DataPoint],
    project: impl Fn(DataPoint) -> PixelPoint + Sync,
) -> Vec<PixelPoint> {
    points.par_iter().copied().map(project).collect()
}

fn validate_viewport(viewport: Viewport) -> ChartResult<()> {
    if !viewport.is_valid() {
        return Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(())
}

fn horizontal(domain: (f64, f64), size: Viewport) -> ChartResult<LinearScale> {
    LinearScale::new(domain.0, domain.1, 0.0, size.width_f64())
}

fn vertical(domain: (f64, f64), size: Viewport) -> ChartResult<LinearScale> {
    LinearScale::new(domain.0, domain.1, size.height_f64(), 0.0)
}

#[cfg(test)]
mod tests {
    use super::CoordinateMapper;
    use crate::core::{DataExtent, DataPoint, PixelPoint, ScaleExtent, ViewTransform, Viewport};
    use approx::assert_relative_eq;

    fn mapper() -> CoordinateMapper {
        let mut mapper = CoordinateMapper::new(
            Viewport::new(400, 200),
            Viewport::new(1000, 1000),
            ScaleExtent::default(),
        )
        .expect("mapper");
        let extent = DataExtent::from_points(&[DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 5.0)])
            .expect("extent");
        mapper.set_extent(extent).expect("set extent");
        mapper
    }

    #[test]
    fn display_and_identity_project_full_domain() {
        let mapper = mapper();
        let display = mapper.project_display(DataPoint::new(10.0, 5.0));
        assert_relative_eq!(display.x, 400.0);
        assert_relative_eq!(display.y, 0.0);

        let identity = mapper.project_identity(DataPoint::new(0.0, 0.0));
        assert_relative_eq!(identity.x, 0.0);
        assert_relative_eq!(identity.y, 1000.0);
    }

    #[test]
    fn zoom_narrows_display_domain_only() {
        let mut mapper = mapper();
        let identity_before = mapper.identity_domain();

        let applied = mapper
            .zoom_to(ViewTransform::new(-200.0, -100.0, 2.0))
            .expect("zoom");
        assert_eq!(applied, ViewTransform::new(-200.0, -100.0, 2.0));

        let ((x0, x1), (y0, y1)) = mapper.display_domain();
        assert_relative_eq!(x0, 2.5);
        assert_relative_eq!(x1, 7.5);
        assert_relative_eq!(y0, 1.25);
        assert_relative_eq!(y1, 3.75);
        assert_eq!(mapper.identity_domain(), identity_before);
    }

    #[test]
    fn screen_to_identity_survives_zoom() {
        let mut mapper = mapper();
        let data = DataPoint::new(6.0, 2.0);
        let before = mapper.screen_to_identity(mapper.project_display(data));

        mapper
            .zoom_to(ViewTransform::new(-150.0, -40.0, 3.0))
            .expect("zoom");
        let after = mapper.screen_to_identity(mapper.project_display(data));

        assert_relative_eq!(before.x, after.x, epsilon = 1e-9);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-9);
        assert_relative_eq!(after.x, 600.0, epsilon = 1e-9);
        assert_relative_eq!(after.y, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn resize_keeps_identity_mapping() {
        let mut mapper = mapper();
        let identity_before = mapper.project_identity(DataPoint::new(3.0, 1.0));
        mapper.update_size(Viewport::new(800, 600)).expect("resize");

        let display = mapper.project_display(DataPoint::new(10.0, 0.0));
        assert_relative_eq!(display.x, 800.0);
        assert_relative_eq!(display.y, 600.0);
        assert_eq!(mapper.project_identity(DataPoint::new(3.0, 1.0)), identity_before);
        assert!(mapper.update_size(Viewport::new(0, 10)).is_err());
    }

    #[test]
    fn new_extent_resets_view_transform() {
        let mut mapper = mapper();
        mapper
            .zoom_to(ViewTransform::new(-10.0, 0.0, 2.0))
            .expect("zoom");
        let grown = DataExtent::from_points(&[DataPoint::new(-5.0, 0.0), DataPoint::new(10.0, 5.0)])
            .expect("extent");
        assert!(mapper.set_extent(grown).expect("set extent"));
        assert!(mapper.transform().is_identity());
        assert!(!mapper.set_extent(grown).expect("same extent"));

        let pixel = mapper.invert_display(PixelPoint::new(0.0, 200.0));
        assert_relative_eq!(pixel.x, -5.0);
        assert_relative_eq!(pixel.y, 0.0);
    }
}
