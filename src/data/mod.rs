//! Data-file description, parsing and fetch bookkeeping for series loading.

mod load_tracker;
mod parser;

pub use load_tracker::{FetchRequest, FetchTicket, LoadOutcome, LoadProgress, LoadTracker};
pub use parser::{LEGACY_HEADER_LINES, LEGACY_ROW_STRIDE, parse_points};

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::SeriesId;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Column separator of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
    /// Runs of spaces/tabs. Files in this format are instrument logs and
    /// follow the legacy header-skip and down-sampling rule.
    Whitespace,
    Other(char),
}

impl Delimiter {
    pub fn byte(self) -> ChartResult<u8> {
        match self {
            Self::Tab | Self::Whitespace => Ok(b'\t'),
            Self::Comma => Ok(b','),
            Self::Other(ch) if ch.is_ascii() && ch != '\n' && ch != '\r' => Ok(ch as u8),
            Self::Other(ch) => Err(ChartError::InvalidData(format!(
                "delimiter {ch:?} must be a single ASCII character"
            ))),
        }
    }
}

/// Where and how to read one trace of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSetSpec {
    pub file: String,
    /// Column for x; `None` uses the row number.
    #[serde(default)]
    pub column_x: Option<usize>,
    /// Column for y; `None` reads x and y from the first two columns.
    #[serde(default)]
    pub column_y: Option<usize>,
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub background_color: Option<Color>,
}

impl DataSetSpec {
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            column_x: None,
            column_y: None,
            delimiter: Delimiter::default(),
            color: None,
            background_color: None,
        }
    }

    #[must_use]
    pub fn with_columns(mut self, column_x: Option<usize>, column_y: Option<usize>) -> Self {
        self.column_x = column_x;
        self.column_y = column_y;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }
}

/// Resolves which files hold the data of a series.
///
/// `None` means there is no data for `id`.
pub trait DataSource {
    fn resolve(&self, id: SeriesId) -> Option<Vec<DataSetSpec>>;
}

impl<F> DataSource for F
where
    F: Fn(SeriesId) -> Option<Vec<DataSetSpec>>,
{
    fn resolve(&self, id: SeriesId) -> Option<Vec<DataSetSpec>> {
        self(id)
    }
}

/// Synchronous text retrieval for headless loading.
pub trait TextFetcher {
    fn fetch_text(&mut self, file: &str) -> Result<String, String>;
}

impl<F> TextFetcher for F
where
    F: FnMut(&str) -> Result<String, String>,
{
    fn fetch_text(&mut self, file: &str) -> Result<String, String> {
        self(file)
    }
}

/// Reads data files from the local filesystem, relative to `root`.
#[derive(Debug, Clone, Default)]
pub struct FsTextFetcher {
    root: PathBuf,
}

impl FsTextFetcher {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextFetcher for FsTextFetcher {
    fn fetch_text(&mut self, file: &str) -> Result<String, String> {
        fs::read_to_string(self.root.join(file)).map_err(|err| err.to_string())
    }
}
