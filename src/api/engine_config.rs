use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{ScaleExtent, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{HitTestConfig, InteractionMode};
use crate::render::{Color, LayerStyles};

use super::RedrawBudgets;

/// Public line-chart bootstrap configuration.
///
/// Serializable so hosts can persist chart setup next to their data
/// descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    pub viewport: Viewport,
    /// Fixed resolution of the picking raster, independent of `viewport`.
    #[serde(default = "default_identity_size")]
    pub identity_size: Viewport,
    #[serde(default)]
    pub layer_styles: LayerStyles,
    #[serde(default)]
    pub budgets: RedrawBudgets,
    #[serde(default = "default_identity_debounce_ms")]
    pub identity_debounce_ms: u64,
    #[serde(default)]
    pub hit_test: HitTestConfig,
    #[serde(default)]
    pub scale_extent: ScaleExtent,
    #[serde(default = "default_base_line_color")]
    pub base_line_color: Color,
    /// Highlight color of traces that carry no color of their own.
    #[serde(default = "default_highlight_fallback_color")]
    pub highlight_fallback_color: Color,
    #[serde(default)]
    pub initial_mode: InteractionMode,
}

impl LineChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            identity_size: default_identity_size(),
            layer_styles: LayerStyles::default(),
            budgets: RedrawBudgets::default(),
            identity_debounce_ms: default_identity_debounce_ms(),
            hit_test: HitTestConfig::default(),
            scale_extent: ScaleExtent::default(),
            base_line_color: default_base_line_color(),
            highlight_fallback_color: default_highlight_fallback_color(),
            initial_mode: InteractionMode::default(),
        }
    }

    #[must_use]
    pub fn with_identity_size(mut self, size: Viewport) -> Self {
        self.identity_size = size;
        self
    }

    #[must_use]
    pub fn with_layer_styles(mut self, styles: LayerStyles) -> Self {
        self.layer_styles = styles;
        self
    }

    #[must_use]
    pub fn with_budgets(mut self, budgets: RedrawBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    #[must_use]
    pub fn with_identity_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.identity_debounce_ms = debounce_ms;
        self
    }

    #[must_use]
    pub fn with_hit_test(mut self, hit_test: HitTestConfig) -> Self {
        self.hit_test = hit_test;
        self
    }

    #[must_use]
    pub fn with_scale_extent(mut self, extent: ScaleExtent) -> Self {
        self.scale_extent = extent;
        self
    }

    #[must_use]
    pub fn with_base_line_color(mut self, color: Color) -> Self {
        self.base_line_color = color;
        self
    }

    #[must_use]
    pub fn with_initial_mode(mut self, mode: InteractionMode) -> Self {
        self.initial_mode = mode;
        self
    }

    #[must_use]
    pub fn identity_debounce(self) -> Duration {
        Duration::from_millis(self.identity_debounce_ms)
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (name, size) in [("viewport", self.viewport), ("identity_size", self.identity_size)] {
            if !size.is_valid() {
                return Err(ChartError::Config(format!(
                    "{name} must be non-zero, got {}x{}",
                    size.width, size.height
                )));
            }
        }
        if !self.scale_extent.is_valid() {
            return Err(ChartError::Config(
                "scale extent must satisfy 0 < min <= max".to_owned(),
            ));
        }
        self.layer_styles.validate()?;
        self.budgets.validate()?;
        self.hit_test.validate()?;
        self.base_line_color.validate()?;
        self.highlight_fallback_color.validate()?;
        Ok(())
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::Config(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::Config(format!("failed to parse config: {e}")))
    }
}

fn default_identity_size() -> Viewport {
    Viewport::new(1000, 1000)
}

fn default_identity_debounce_ms() -> u64 {
    100
}

fn default_base_line_color() -> Color {
    Color::GREY
}

fn default_highlight_fallback_color() -> Color {
    Color::BLACK
}
