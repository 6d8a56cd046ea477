//! Validated 2-D grid of colors
//!
//! A `Grid` is always rectangular and non-empty: every row holds the same,
//! non-zero number of columns. Rows map to the y axis of the rendered image
//! and columns to the x axis.

use crate::{Color, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Color>>,
    columns: usize,
}

impl Grid {
    /// Build a grid, rejecting empty and ragged input.
    pub fn new(rows: Vec<Vec<Color>>) -> Result<Self> {
        let columns = match rows.first() {
            Some(first) => first.len(),
            None => return Err(Error::InvalidGrid("grid has no rows".into())),
        };
        for (index, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(Error::InvalidGrid(format!("row {} has no columns", index)));
            }
            if row.len() != columns {
                return Err(Error::InvalidGrid(format!(
                    "row {} has {} columns, expected {}",
                    index,
                    row.len(),
                    columns
                )));
            }
        }
        Ok(Self { rows, columns })
    }

    /// Parse `[[{"R":..,"G":..,"B":..,"A":..}, ...], ...]`.
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<Vec<Color>> = serde_json::from_str(json)?;
        Self::new(rows)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// The 2x2 grid pre-filled into the HTML form.
    pub fn sample() -> Self {
        let red = Color::rgba(200, 0, 0, 255);
        let green = Color::rgba(0, 100, 0, 255);
        Self {
            rows: vec![vec![red, red], vec![green, red]],
            columns: 2,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Option<Color> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Every cell as `(row, column, color)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, c)| (i, j, *c)))
    }
}
