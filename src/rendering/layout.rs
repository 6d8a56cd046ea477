/// Grid geometry: cell size, image size and the rectangles derived from them

use crate::{Error, Grid, RenderConfig, Result};

/// Axis-aligned rectangle in pixel space, `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Side of one square cell in pixels.
    pub cell_size: u32,
    /// Side of the square output image, including the closing border pixel.
    pub image_size: u32,
    pub rows: u32,
    pub columns: u32,
    pub line_width: u32,
}

impl GridLayout {
    /// Size the image from the row count: `cell = width / rows` and
    /// `size = cell * rows + 1`.
    pub fn compute(grid: &Grid, config: &RenderConfig) -> Result<Self> {
        let rows = u32::try_from(grid.rows())
            .map_err(|_| Error::InvalidGrid(format!("{} rows is too many", grid.rows())))?;
        let columns = u32::try_from(grid.columns())
            .map_err(|_| Error::InvalidGrid(format!("{} columns is too many", grid.columns())))?;
        if rows == 0 {
            return Err(Error::InvalidGrid("grid has no rows".into()));
        }

        let cell_size = config.image_width / rows;
        if cell_size == 0 {
            return Err(Error::InvalidGrid(format!(
                "{} rows do not fit in a {}px wide image",
                rows, config.image_width
            )));
        }
        let image_size = (cell_size * rows)
            .checked_add(1)
            .ok_or_else(|| Error::InvalidGrid("image width overflows".into()))?;

        Ok(Self {
            cell_size,
            image_size,
            rows,
            columns,
            line_width: config.line_width,
        })
    }

    /// Rectangle for the cell at `row` (y axis) and `column` (x axis).
    pub fn cell_rect(&self, row: u32, column: u32) -> Rect {
        Rect {
            x: column.saturating_mul(self.cell_size),
            y: row.saturating_mul(self.cell_size),
            width: self.cell_size,
            height: self.cell_size,
        }
    }

    /// Whether any part of `rect` lands on the image.
    pub fn is_visible(&self, rect: &Rect) -> bool {
        rect.x < self.image_size && rect.y < self.image_size
    }

    /// Full-height line at the left edge of column `index`.
    pub fn vertical_line(&self, index: u32) -> Rect {
        Rect {
            x: index.saturating_mul(self.cell_size),
            y: 0,
            width: self.line_width,
            height: self.image_size,
        }
    }

    /// Full-width line at the top edge of row `index`.
    pub fn horizontal_line(&self, index: u32) -> Rect {
        Rect {
            x: 0,
            y: index.saturating_mul(self.cell_size),
            width: self.image_size,
            height: self.line_width,
        }
    }
}
