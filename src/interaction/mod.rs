mod hit_test;

pub use hit_test::{HitTestConfig, HitTester, Vote};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::SeriesId;
use crate::error::ChartError;

/// How pointer input on the chart is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Pan/zoom, hover and click.
    #[default]
    Zoom,
    /// Dragging over shown series emits erase events.
    Erase,
    /// Dragging over erased series emits include events.
    Include,
}

impl InteractionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zoom => "zoom",
            Self::Erase => "erase",
            Self::Include => "include",
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionMode {
    type Err = ChartError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "zoom" => Ok(Self::Zoom),
            "erase" => Ok(Self::Erase),
            "include" => Ok(Self::Include),
            other => Err(ChartError::InvalidData(format!(
                "unknown interaction mode `{other}`"
            ))),
        }
    }
}

/// Pointer position (display pixels) attached to hover and click events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInfo {
    pub x: f64,
    pub y: f64,
}

impl PointerInfo {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    last_pointer: Option<PointerInfo>,
    hovered: Option<SeriesId>,
}

impl InteractionState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn last_pointer(self) -> Option<PointerInfo> {
        self.last_pointer
    }

    pub fn set_last_pointer(&mut self, pointer: Option<PointerInfo>) {
        self.last_pointer = pointer;
    }

    #[must_use]
    pub fn hovered(self) -> Option<SeriesId> {
        self.hovered
    }

    /// Records the hovered id; returns `true` when it changed.
    pub fn update_hovered(&mut self, hovered: Option<SeriesId>) -> bool {
        if self.hovered == hovered {
            return false;
        }
        self.hovered = hovered;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{InteractionMode, InteractionState};
    use crate::core::SeriesId;

    #[test]
    fn mode_parses_from_host_strings() {
        assert_eq!("zoom".parse::<InteractionMode>().expect("zoom"), InteractionMode::Zoom);
        let include = "include".parse::<InteractionMode>().expect("include");
        assert_eq!(include, InteractionMode::Include);
        assert!("lasso".parse::<InteractionMode>().is_err());
        assert_eq!(InteractionMode::Erase.to_string(), "erase");
    }

    #[test]
    fn hovered_change_is_reported_once() {
        let mut state = InteractionState::default();
        assert!(!state.update_hovered(None));
        assert!(state.update_hovered(Some(SeriesId::new(3))));
        assert!(!state.update_hovered(Some(SeriesId::new(3))));
        assert!(state.update_hovered(None));
    }
}
