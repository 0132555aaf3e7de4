use crate::error::{ChartError, ChartResult};

/// Affine map from a data domain onto a pixel range.
///
/// The range may be reversed (`range_start > range_end`), which is how
/// vertical scales put larger values towards the top of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> ChartResult<Self> {
        validate_span(domain_start, domain_end, "scale domain")?;
        validate_span(range_start, range_end, "scale range")?;

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn with_domain(self, domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        Self::new(domain_start, domain_end, self.range_start, self.range_end)
    }

    pub fn with_range(self, range_start: f64, range_end: f64) -> ChartResult<Self> {
        Self::new(self.domain_start, self.domain_end, range_start, range_end)
    }

    /// Maps a domain value to pixel space. Non-finite input stays non-finite.
    #[must_use]
    pub fn project(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let normalized = (pixel - self.range_start) / (self.range_end - self.range_start);
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }
}

fn validate_span(start: f64, end: f64, what: &str) -> ChartResult<()> {
    if !start.is_finite() || !end.is_finite() || start == end {
        return Err(ChartError::InvalidData(format!(
            "{what} must be finite and non-zero"
        )));
    }
    Ok(())
}
