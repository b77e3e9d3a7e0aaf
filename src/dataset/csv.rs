//! CSV loading into [`DatasetStorage`].
//!
//! Supported format:
//! - UTF-8, comma-separated, LF line endings (a CR before LF is rejected)
//! - A header row is required; its contents are ignored
//! - Column 0 is an integer label, optionally negative
//! - Remaining columns are plain decimals: optional `-`, digits, at most one
//!   `.` (`-.3`, `-00.0001` and `091.100` are fine; exponents are not)
//! - No quoting, no spaces
//!
//! The caller declares `num_rows` (including the header) and `num_cols`
//! (including the label); exactly `num_rows - 1` data rows are read.

use std::fs;
use std::path::Path;

use log::debug;

use crate::dataset::storage::DatasetStorage;
use crate::dataset::view::DatasetView;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reads and parses the CSV file at `path` with a declared shape.
pub fn load_csv(
    path: impl AsRef<Path>,
    num_rows: usize,
    num_cols: usize,
) -> Result<(DatasetStorage, DatasetView)> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let parsed = parse_csv(&data, num_rows, num_cols)?;
    debug!(
        "loaded {} examples with {} attributes from {}",
        parsed.0.len(),
        parsed.0.num_attributes(),
        path.display()
    );
    Ok(parsed)
}

/// Reads the CSV file at `path`, taking its shape from the file itself.
pub fn load_csv_auto(path: impl AsRef<Path>) -> Result<(DatasetStorage, DatasetView)> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let (num_rows, num_cols) = detect_shape(&data)?;
    debug!("{}: detected {num_rows} rows x {num_cols} columns", path.display());
    parse_csv(&data, num_rows, num_cols)
}

/// Parses CSV bytes into storage plus a view in file row order.
pub fn parse_csv(
    data: &[u8],
    num_rows: usize,
    num_cols: usize,
) -> Result<(DatasetStorage, DatasetView)> {
    if num_rows < 2 {
        return Err(Error::InvalidConfig(format!(
            "num_rows counts the header and must be >= 2, got {num_rows}"
        )));
    }
    if num_cols < 2 {
        return Err(Error::InvalidConfig(format!(
            "num_cols counts the label column and must be >= 2, got {num_cols}"
        )));
    }

    let text = std::str::from_utf8(data)
        .map_err(|e| Error::data_format(line_of_offset(data, e.valid_up_to()), "not valid UTF-8"))?;

    let num_examples = num_rows - 1;
    let num_attributes = num_cols - 1;
    let mut storage = DatasetStorage::with_capacity(num_attributes, num_examples)?;
    let mut attributes = vec![0.0; num_attributes];

    let mut lines = text.split('\n');
    match lines.next() {
        Some(header) if !header.is_empty() => check_line_ending(header, 1)?,
        _ => return Err(Error::data_format(1, "missing header row")),
    }

    for row in 0..num_examples {
        let line_no = row + 2;
        let line = lines.next().filter(|l| !l.is_empty()).ok_or_else(|| {
            Error::data_format(
                line_no,
                format!("expected {num_examples} data rows, found {row}"),
            )
        })?;
        check_line_ending(line, line_no)?;

        let mut cells = line.split(',');
        let label = parse_label(cells.next().unwrap_or(""), line_no)?;
        for (k, slot) in attributes.iter_mut().enumerate() {
            let cell = cells.next().ok_or_else(|| {
                Error::data_format(
                    line_no,
                    format!("expected {num_cols} columns, found {}", k + 1),
                )
            })?;
            *slot = parse_attribute(cell, line_no)?;
        }
        if cells.next().is_some() {
            return Err(Error::data_format(
                line_no,
                format!("expected {num_cols} columns, found {}", line.split(',').count()),
            ));
        }

        storage.push(label, &attributes)?;
    }

    let view = storage.view();
    Ok((storage, view))
}

/// Counts `(num_rows, num_cols)` the way [`parse_csv`] expects them: every
/// non-empty line is a row, and the header decides the column count.
pub fn detect_shape(data: &[u8]) -> Result<(usize, usize)> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::data_format(line_of_offset(data, e.valid_up_to()), "not valid UTF-8"))?;
    let header = text
        .split('\n')
        .next()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::data_format(1, "missing header row"))?;
    let num_cols = header.trim_end_matches('\r').split(',').count();
    let num_rows = text.split('\n').filter(|l| !l.is_empty()).count();
    Ok((num_rows, num_cols))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn check_line_ending(line: &str, line_no: usize) -> Result<()> {
    if line.ends_with('\r') {
        return Err(Error::data_format(
            line_no,
            "CRLF line endings are not supported",
        ));
    }
    Ok(())
}

/// Optional `-` followed by at least one ASCII digit.
fn parse_label(cell: &str, line_no: usize) -> Result<i32> {
    let digits = cell.strip_prefix('-').unwrap_or(cell);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::data_format(
            line_no,
            format!("label '{cell}' is not an integer"),
        ));
    }
    cell.parse::<i32>().map_err(|_| {
        Error::data_format(line_no, format!("label '{cell}' does not fit in i32"))
    })
}

/// Optional `-`, then digits with at most one `.`, at least one digit overall.
fn parse_attribute(cell: &str, line_no: usize) -> Result<f64> {
    let body = cell.strip_prefix('-').unwrap_or(cell);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => {
                seen_digit = false;
                break;
            }
        }
    }
    if !seen_digit {
        return Err(Error::data_format(
            line_no,
            format!("'{cell}' is not a valid number"),
        ));
    }
    cell.parse::<f64>()
        .map_err(|_| Error::data_format(line_no, format!("'{cell}' is not a valid number")))
}

fn line_of_offset(data: &[u8], offset: usize) -> usize {
    data[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
