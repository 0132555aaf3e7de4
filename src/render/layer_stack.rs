use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Raster layers of one line chart, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Erased series, greyed out.
    Hidden,
    Shown,
    Highlight,
    /// Off-screen flat-color raster used only for picking.
    Identity,
}

impl LayerKind {
    pub const ALL: [Self; 4] = [Self::Hidden, Self::Shown, Self::Highlight, Self::Identity];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Hidden => 0,
            Self::Shown => 1,
            Self::Highlight => 2,
            Self::Identity => 3,
        }
    }

    /// Whether the layer is composited on screen.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Identity)
    }
}

/// Global alpha and stroke width applied to every polyline of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub alpha: f64,
    pub stroke_width: f64,
}

impl LayerStyle {
    #[must_use]
    pub const fn new(alpha: f64, stroke_width: f64) -> Self {
        Self {
            alpha,
            stroke_width,
        }
    }
}

/// Per-layer styles. The identity style's alpha is ignored: identity strokes
/// are always opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyles {
    #[serde(default = "default_hidden_style")]
    pub hidden: LayerStyle,
    #[serde(default = "default_shown_style")]
    pub shown: LayerStyle,
    #[serde(default = "default_highlight_style")]
    pub highlight: LayerStyle,
    #[serde(default = "default_identity_style")]
    pub identity: LayerStyle,
}

impl Default for LayerStyles {
    fn default() -> Self {
        Self {
            hidden: default_hidden_style(),
            shown: default_shown_style(),
            highlight: default_highlight_style(),
            identity: default_identity_style(),
        }
    }
}

impl LayerStyles {
    #[must_use]
    pub fn get(&self, layer: LayerKind) -> LayerStyle {
        match layer {
            LayerKind::Hidden => self.hidden,
            LayerKind::Shown => self.shown,
            LayerKind::Highlight => self.highlight,
            LayerKind::Identity => self.identity,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        for layer in LayerKind::ALL {
            let style = self.get(layer);
            if !style.alpha.is_finite() || !(0.0..=1.0).contains(&style.alpha) {
                return Err(ChartError::Config(format!(
                    "{layer:?} layer alpha must be in [0, 1]"
                )));
            }
            if !style.stroke_width.is_finite() || style.stroke_width <= 0.0 {
                return Err(ChartError::Config(format!(
                    "{layer:?} layer stroke width must be finite and > 0"
                )));
            }
        }
        // Majority voting needs strokes wider than the blended edge pixels.
        if self.identity.stroke_width < 3.0 {
            return Err(ChartError::Config(
                "identity stroke width must be at least 3 px".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_hidden_style() -> LayerStyle {
    LayerStyle::new(0.5, 1.0)
}

fn default_shown_style() -> LayerStyle {
    LayerStyle::new(0.2, 1.0)
}

fn default_highlight_style() -> LayerStyle {
    LayerStyle::new(1.0, 3.0)
}

fn default_identity_style() -> LayerStyle {
    LayerStyle::new(1.0, 4.0)
}
