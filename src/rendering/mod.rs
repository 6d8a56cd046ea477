//! Grid renderer: layout → paint → raster → PNG

pub mod layout;
pub mod paint;
pub mod raster;

use std::io::Write;

use log::debug;
use sha2::{Digest, Sha256};

use crate::{Grid, RenderConfig, Result};
use layout::GridLayout;
use raster::Canvas;

/// A fully encoded image, ready to be sent.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl RenderedImage {
    /// SHA-256 of the PNG bytes, hex encoded.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Lay out, paint and rasterize `grid` without encoding it.
pub fn render_canvas(grid: &Grid, config: &RenderConfig) -> Result<Canvas> {
    let layout = GridLayout::compute(grid, config)?;
    let commands = paint::paint_grid(grid, &layout, config);
    debug!(
        "grid {}x{} -> {}px image, {}px cells, {} paint commands",
        layout.rows,
        layout.columns,
        layout.image_size,
        layout.cell_size,
        commands.len()
    );
    Ok(raster::rasterize(&commands, layout.image_size))
}

/// Render `grid` to an in-memory PNG.
pub fn render_grid(grid: &Grid, config: &RenderConfig) -> Result<RenderedImage> {
    let canvas = render_canvas(grid, config)?;
    let mut png_data = Vec::new();
    canvas.encode_png(&mut png_data)?;
    let image = RenderedImage {
        width: canvas.width(),
        height: canvas.height(),
        png_data,
    };
    debug!("encoded {} bytes, sha256 {}", image.png_data.len(), image.digest());
    Ok(image)
}

/// Render `grid` and stream the PNG into `writer`.
pub fn write_png<W: Write>(writer: W, grid: &Grid, config: &RenderConfig) -> Result<()> {
    render_canvas(grid, config)?.encode_png(writer)
}
