use serde::{Deserialize, Serialize};

use crate::core::DataPoint;

/// Half-width applied around a collapsed axis so scales keep a non-zero span.
const DEGENERATE_PADDING: f64 = 0.5;

/// Bounding box of every finite point seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataExtent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataExtent {
    #[must_use]
    pub fn from_point(point: DataPoint) -> Self {
        Self {
            x_min: point.x,
            x_max: point.x,
            y_min: point.y,
            y_max: point.y,
        }
    }

    /// Returns `None` when `points` holds no finite sample.
    #[must_use]
    pub fn from_points(points: &[DataPoint]) -> Option<Self> {
        let mut finite = points.iter().copied().filter(|point| point.is_finite());
        let first = finite.next()?;
        Some(finite.fold(Self::from_point(first), Self::include_point))
    }

    #[must_use]
    pub fn include_point(self, point: DataPoint) -> Self {
        Self {
            x_min: self.x_min.min(point.x),
            x_max: self.x_max.max(point.x),
            y_min: self.y_min.min(point.y),
            y_max: self.y_max.max(point.y),
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    #[must_use]
    pub fn x_domain(self) -> (f64, f64) {
        padded(self.x_min, self.x_max)
    }

    #[must_use]
    pub fn y_domain(self) -> (f64, f64) {
        padded(self.y_min, self.y_max)
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - DEGENERATE_PADDING, max + DEGENERATE_PADDING)
    } else {
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::DataExtent;
    use crate::core::DataPoint;

    #[test]
    fn extent_ignores_non_finite_points() {
        let extent = DataExtent::from_points(&[
            DataPoint::new(f64::NAN, 4.0),
            DataPoint::new(1.0, 2.0),
            DataPoint::new(-3.0, 8.0),
            DataPoint::new(2.0, f64::INFINITY),
        ])
        .expect("finite points present");
        assert_eq!(extent.x_min, -3.0);
        assert_eq!(extent.x_max, 1.0);
        assert_eq!(extent.y_min, 2.0);
        assert_eq!(extent.y_max, 8.0);
    }

    #[test]
    fn extent_of_only_non_finite_points_is_none() {
        assert!(DataExtent::from_points(&[DataPoint::new(f64::NAN, 0.0)]).is_none());
        assert!(DataExtent::from_points(&[]).is_none());
    }

    #[test]
    fn collapsed_axis_is_padded() {
        let extent = DataExtent::from_points(&[DataPoint::new(5.0, 1.0), DataPoint::new(5.0, 3.0)])
            .expect("extent");
        assert_eq!(extent.x_domain(), (4.5, 5.5));
        assert_eq!(extent.y_domain(), (1.0, 3.0));
    }
}
