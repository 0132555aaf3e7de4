use serde::{Deserialize, Serialize};

use crate::core::Viewport;

/// Allowed zoom factors for the display mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 20.0,
        }
    }
}

impl ScaleExtent {
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }

    #[must_use]
    pub fn clamp(self, k: f64) -> f64 {
        k.max(self.min).min(self.max)
    }
}

/// Pan offset (`x`, `y`, in display pixels) and zoom factor `k`.
///
/// A screen pixel `p` shows the unzoomed pixel `(p - offset) / k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }

    #[must_use]
    pub const fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::identity()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.k.is_finite()
    }

    /// Clamps the zoom factor and keeps the zoomed view inside the viewport,
    /// so panning never reveals space outside the data domain.
    #[must_use]
    pub fn constrained(self, viewport: Viewport, extent: ScaleExtent) -> Self {
        let k = extent.clamp(self.k);
        let min_x = (viewport.width_f64() * (1.0 - k)).min(0.0);
        let min_y = (viewport.height_f64() * (1.0 - k)).min(0.0);
        Self {
            x: self.x.clamp(min_x, 0.0),
            y: self.y.clamp(min_y, 0.0),
            k,
        }
    }
}
