use std::borrow::Cow;

use csv::{ReaderBuilder, Trim};

use crate::core::DataPoint;
use crate::data::{DataSetSpec, Delimiter};
use crate::error::{ChartError, ChartResult};

/// Header lines skipped in whitespace-delimited instrument logs.
pub const LEGACY_HEADER_LINES: usize = 2;
/// Only every n-th row after the header of such logs is kept.
pub const LEGACY_ROW_STRIDE: usize = 10;

/// Parses the text of one data file into points.
///
/// Cells that are not numbers read as NaN; rows whose x or y is not finite
/// are dropped. A file yielding no point at all is an error.
pub fn parse_points(text: &str, spec: &DataSetSpec) -> ChartResult<Vec<DataPoint>> {
    let parse_error = |reason: String| ChartError::Parse {
        file: spec.file.clone(),
        reason,
    };
    if text.trim().is_empty() {
        return Err(parse_error("file is empty".to_owned()));
    }

    let delimiter = spec.delimiter.byte()?;
    let normalized: Cow<'_, str> = match spec.delimiter {
        Delimiter::Whitespace => Cow::Owned(legacy_whitespace_rows(text)),
        _ => Cow::Borrowed(text),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(normalized.as_bytes());

    let mut points = Vec::new();
    let mut row_index = 0usize;
    for record in reader.records() {
        let record = record.map_err(|err| parse_error(err.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let cell = |column: usize| record.get(column).map_or(f64::NAN, parse_cell);
        let point = match spec.column_y {
            Some(column_y) => {
                let x = match spec.column_x {
                    Some(column_x) => cell(column_x),
                    None => row_index as f64,
                };
                DataPoint::new(x, cell(column_y))
            }
            None => DataPoint::new(cell(0), cell(1)),
        };
        row_index += 1;
        if point.is_finite() {
            points.push(point);
        }
    }

    if points.is_empty() {
        return Err(parse_error("no numeric rows".to_owned()));
    }
    Ok(points)
}

fn parse_cell(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Drops the header, keeps every `LEGACY_ROW_STRIDE`-th line and rewrites
/// whitespace runs as tabs.
fn legacy_whitespace_rows(text: &str) -> String {
    text.lines()
        .skip(LEGACY_HEADER_LINES)
        .step_by(LEGACY_ROW_STRIDE)
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::parse_points;
    use crate::core::DataPoint;
    use crate::data::{DataSetSpec, Delimiter};
    use crate::error::ChartError;

    #[test]
    fn tab_file_uses_first_two_columns_by_default() {
        let spec = DataSetSpec::new("a.tsv");
        let points = parse_points("0\t1.5\n1\t2.5\n", &spec).expect("parse");
        assert_eq!(points, vec![DataPoint::new(0.0, 1.5), DataPoint::new(1.0, 2.5)]);
    }

    #[test]
    fn selected_columns_and_row_index_x() {
        let spec = DataSetSpec::new("a.csv")
            .with_delimiter(Delimiter::Comma)
            .with_columns(None, Some(2));
        let points = parse_points("9,9,10\n9,9,20\n9,9,30", &spec).expect("parse");
        assert_eq!(
            points,
            vec![
                DataPoint::new(0.0, 10.0),
                DataPoint::new(1.0, 20.0),
                DataPoint::new(2.0, 30.0)
            ]
        );

        let spec = spec.with_columns(Some(1), Some(0));
        let points = parse_points("1,2\n3,4", &spec).expect("parse");
        assert_eq!(points, vec![DataPoint::new(2.0, 1.0), DataPoint::new(4.0, 3.0)]);
    }

    #[test]
    fn whitespace_logs_skip_header_and_keep_every_tenth_row() {
        let mut text = String::from("instrument v2\ntime   velocity\n");
        for row in 0..30 {
            text.push_str(&format!("  {row}    {}  \n", row * 2));
        }
        let spec = DataSetSpec::new("log.txt").with_delimiter(Delimiter::Whitespace);
        let points = parse_points(&text, &spec).expect("parse");
        assert_eq!(
            points,
            vec![
                DataPoint::new(0.0, 0.0),
                DataPoint::new(10.0, 20.0),
                DataPoint::new(20.0, 40.0)
            ]
        );
    }

    #[test]
    fn non_numeric_rows_are_dropped_and_empty_files_fail() {
        let spec = DataSetSpec::new("a.tsv");
        let points = parse_points("x\ty\n1\t2\n", &spec).expect("parse");
        assert_eq!(points, vec![DataPoint::new(1.0, 2.0)]);

        assert!(matches!(
            parse_points("   \n", &spec),
            Err(ChartError::Parse { .. })
        ));
        assert!(matches!(
            parse_points("a\tb\n", &spec),
            Err(ChartError::Parse { .. })
        ));
    }
}
