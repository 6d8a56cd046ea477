/// Display list for a grid: cell fills first, gridlines on top

use super::layout::{GridLayout, Rect};
use crate::{Color, Grid, RenderConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Cell {
        row: u32,
        column: u32,
        rect: Rect,
        color: Color,
    },
    GridLine {
        rect: Rect,
        color: Color,
    },
}

impl PaintCommand {
    pub fn rect(&self) -> Rect {
        match self {
            PaintCommand::Cell { rect, .. } | PaintCommand::GridLine { rect, .. } => *rect,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PaintCommand::Cell { color, .. } | PaintCommand::GridLine { color, .. } => *color,
        }
    }
}

/// Build the ordered paint commands for `grid`. Cells that fall entirely
/// outside the image are dropped; the rasterizer clips the rest.
pub fn paint_grid(grid: &Grid, layout: &GridLayout, config: &RenderConfig) -> Vec<PaintCommand> {
    let mut commands = Vec::with_capacity(grid.rows() * grid.columns() + 2 * (grid.rows() + 1));

    for (i, j, color) in grid.cells() {
        // Row and column counts were bounded to u32 by the layout.
        let (row, column) = (i as u32, j as u32);
        let rect = layout.cell_rect(row, column);
        if layout.is_visible(&rect) {
            commands.push(PaintCommand::Cell { row, column, rect, color });
        }
    }

    if config.line_width > 0 {
        for index in 0..=layout.rows {
            commands.push(PaintCommand::GridLine {
                rect: layout.vertical_line(index),
                color: config.line_color,
            });
            commands.push(PaintCommand::GridLine {
                rect: layout.horizontal_line(index),
                color: config.line_color,
            });
        }
    }

    commands
}
