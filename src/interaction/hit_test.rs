use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::{CoordinateMapper, PixelPoint, SeriesId};
use crate::error::{ChartError, ChartResult};
use crate::render::identity::{BACKGROUND_RAW, decode_raw, raw_value};
use crate::render::{PixelRect, RasterSurface, Rgba8};

/// Neighborhood size and acceptance threshold of the pixel vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTestConfig {
    /// Window is `(2 * radius + 1)²` pixels.
    pub radius: u32,
    /// Minimum number of samples that must agree on the winning color.
    pub min_votes: usize,
}

impl Default for HitTestConfig {
    fn default() -> Self {
        Self {
            radius: 1,
            min_votes: 4,
        }
    }
}

impl HitTestConfig {
    /// Largest accepted neighborhood radius.
    pub const MAX_RADIUS: u32 = 16;

    #[must_use]
    pub fn window_len(self) -> usize {
        let side = (self.radius as usize).saturating_mul(2).saturating_add(1);
        side.saturating_mul(side)
    }

    pub fn validate(self) -> ChartResult<()> {
        if self.radius > Self::MAX_RADIUS {
            return Err(ChartError::Config(format!(
                "hit-test radius must be <= {}, got {}",
                Self::MAX_RADIUS,
                self.radius
            )));
        }
        if self.min_votes == 0 || self.min_votes > self.window_len() {
            return Err(ChartError::Config(format!(
                "hit-test min_votes must be in 1..={}",
                self.window_len()
            )));
        }
        Ok(())
    }
}

/// Winning raw 24-bit color of a neighborhood and how many samples had it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vote {
    pub raw: u32,
    pub count: usize,
}

/// Resolves screen positions to series ids through the identity raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitTester {
    config: HitTestConfig,
}

impl HitTester {
    #[must_use]
    pub fn new(config: HitTestConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> HitTestConfig {
        self.config
    }

    /// Most frequent raw value among `samples`. Ties go to the smaller raw
    /// value; background takes part in the vote like any other color.
    #[must_use]
    pub fn tally(samples: &[Rgba8]) -> Option<Vote> {
        let mut counts: SmallVec<[Vote; 9]> = SmallVec::new();
        for raw in samples.iter().copied().map(raw_value) {
            match counts.iter_mut().find(|vote| vote.raw == raw) {
                Some(vote) => vote.count += 1,
                None => counts.push(Vote { raw, count: 1 }),
            }
        }
        counts
            .into_iter()
            .max_by(|a, b| a.count.cmp(&b.count).then(b.raw.cmp(&a.raw)))
    }

    /// Accepts the winning vote only when it is not background, reaches the
    /// vote threshold and names a series of `active`.
    #[must_use]
    pub fn resolve(&self, samples: &[Rgba8], active: &IndexSet<SeriesId>) -> Option<SeriesId> {
        let vote = Self::tally(samples)?;
        if vote.raw == BACKGROUND_RAW || vote.count < self.config.min_votes {
            return None;
        }
        decode_raw(vote.raw).filter(|id| active.contains(id))
    }

    /// Maps `screen` into identity-raster space, samples the neighborhood
    /// and resolves it. Positions that land outside the raster pick nothing.
    pub fn find_series_at<S: RasterSurface>(
        &self,
        screen: PixelPoint,
        mapper: &CoordinateMapper,
        identity: &S,
        active: &IndexSet<SeriesId>,
    ) -> Option<SeriesId> {
        if !screen.is_finite() {
            return None;
        }
        let target = mapper.screen_to_identity(screen);
        let size = identity.size();
        let inside = target.x >= 0.0
            && target.y >= 0.0
            && target.x < f64::from(size.width)
            && target.y < f64::from(size.height);
        if !inside {
            trace!(x = screen.x, y = screen.y, "pointer outside the identity raster");
            return None;
        }
        let rect = PixelRect::centered(
            target.x.floor() as i64,
            target.y.floor() as i64,
            self.config.radius,
        );
        let samples = identity.sample(rect);
        let found = self.resolve(&samples, active);
        trace!(x = screen.x, y = screen.y, ?found, "identity lookup");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::{HitTestConfig, HitTester, Vote};
    use crate::core::{
        CoordinateMapper, DataExtent, DataPoint, PixelPoint, ScaleExtent, SeriesId, Viewport,
    };
    use crate::error::ChartError;
    use crate::render::identity::encode_id;
    use crate::render::{PixelBuffer, Rgba8};
    use indexmap::IndexSet;

    fn active(raw: &[u32]) -> IndexSet<SeriesId> {
        raw.iter().copied().map(SeriesId::new).collect()
    }

    fn neighborhood(id: u32, matching: usize) -> Vec<Rgba8> {
        let color = encode_id(SeriesId::new(id)).expect("encode");
        let mut samples = vec![Rgba8::TRANSPARENT; 9];
        samples[..matching].fill(color);
        samples
    }

    #[test]
    fn tally_prefers_smaller_raw_on_ties() {
        let a = encode_id(SeriesId::new(1)).expect("encode");
        let b = encode_id(SeriesId::new(5)).expect("encode");
        let samples = [b, a, b, a, b, a, a, b, Rgba8::TRANSPARENT];
        assert_eq!(HitTester::tally(&samples), Some(Vote { raw: 2, count: 4 }));
        assert_eq!(HitTester::tally(&[]), None);
    }

    #[test]
    fn majority_of_background_resolves_to_none() {
        let tester = HitTester::default();
        assert_eq!(tester.resolve(&neighborhood(3, 4), &active(&[3])), None);
        assert_eq!(tester.resolve(&neighborhood(3, 5), &active(&[3])), Some(SeriesId::new(3)));
    }

    #[test]
    fn series_outside_active_set_is_ignored() {
        let tester = HitTester::default();
        assert_eq!(tester.resolve(&neighborhood(3, 9), &active(&[4])), None);
    }

    #[test]
    fn config_validation_bounds_threshold() {
        assert!(HitTestConfig::default().validate().is_ok());
        assert!(HitTestConfig { radius: 1, min_votes: 10 }.validate().is_err());
        assert!(HitTestConfig { radius: 1, min_votes: 0 }.validate().is_err());
        assert_eq!(HitTestConfig { radius: 2, min_votes: 4 }.window_len(), 25);
    }

    #[test]
    fn oversized_radius_is_a_config_error() {
        let huge = HitTestConfig {
            radius: u32::MAX,
            min_votes: 4,
        };
        assert_eq!(huge.window_len(), usize::MAX);
        assert!(matches!(huge.validate(), Err(ChartError::Config(_))));
        let widest = HitTestConfig {
            radius: HitTestConfig::MAX_RADIUS,
            min_votes: 4,
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn pointer_far_outside_the_raster_picks_nothing() {
        let mut mapper = CoordinateMapper::new(
            Viewport::new(10, 10),
            Viewport::new(10, 10),
            ScaleExtent::default(),
        )
        .expect("mapper");
        mapper
            .set_extent(
                DataExtent::from_points(&[DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 10.0)])
                    .expect("extent"),
            )
            .expect("extent");
        let mut raster = PixelBuffer::new(10, 10);
        let color = encode_id(SeriesId::new(0)).expect("encode");
        for y in 0..10 {
            for x in 0..10 {
                raster.put_pixel(x, y, color);
            }
        }
        let tester = HitTester::default();
        let all = active(&[0]);

        let inside = PixelPoint::new(5.0, 5.0);
        assert_eq!(tester.find_series_at(inside, &mapper, &raster, &all), Some(SeriesId::new(0)));
        for far in [
            PixelPoint::new(-1e300, 5.0),
            PixelPoint::new(5.0, 1e300),
            PixelPoint::new(f64::MAX, f64::MIN),
            PixelPoint::new(10.0, 5.0),
        ] {
            assert_eq!(tester.find_series_at(far, &mapper, &raster, &all), None, "{far:?}");
        }
    }
}
