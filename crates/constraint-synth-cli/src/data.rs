//! Delimited labeled-point loader.
//!
//! Each input line carries the coordinates followed by the label
//! column: `c0 c1 ... cn label`, where label `1` marks a positive
//! point and anything else a negative one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use constraint_synth_core::model::Point;

/// Load labeled points from a delimited text file.
///
/// Blank lines are skipped; every data line must have the same number
/// of columns (at least two: one coordinate plus the label).
pub fn load_points(path: &Path, delimiter: char) -> Result<Vec<Point>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut points = Vec::new();
    let mut dims: Option<usize> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let values: Vec<f64> = trimmed
            .split(delimiter)
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f64>().with_context(|| {
                    format!("line {}: '{}' is not a number", line_no + 1, field)
                })
            })
            .collect::<Result<_>>()?;

        if values.len() < 2 {
            bail!(
                "line {}: expected at least one coordinate and a label, got {} column(s)",
                line_no + 1,
                values.len()
            );
        }

        let (coords, label) = values.split_at(values.len() - 1);
        match dims {
            None => dims = Some(coords.len()),
            Some(d) if d != coords.len() => {
                bail!(
                    "line {}: expected {} coordinates, got {}",
                    line_no + 1,
                    d,
                    coords.len()
                );
            }
            Some(_) => {}
        }

        let positive = (label[0] - 1.0).abs() < f64::EPSILON;
        points.push(Point::new(coords.to_vec(), positive));
    }

    if points.is_empty() {
        bail!("input file {} contains no data lines", path.display());
    }

    Ok(points)
}
