//! gridpng
//!
//! Renders a JSON grid of colors into a PNG made of square cells separated by
//! gridlines, and serves that renderer over a tiny HTTP form endpoint.
//!
//! # Example
//!
//! ```
//! use gridpng::{Grid, RenderConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grid = Grid::from_json(r#"[[{"R":200,"G":0,"B":0,"A":255},{"R":0,"G":100,"B":0,"A":255}],
//!                                [{"R":0,"G":100,"B":0,"A":255},{"R":200,"G":0,"B":0,"A":255}]]"#)?;
//! let image = gridpng::render_grid(&grid, &RenderConfig::default())?;
//! assert_eq!((image.width, image.height), (301, 301));
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod error;
pub mod form;
pub mod grid;
pub mod rendering;
pub mod server;

pub use color::Color;
pub use error::{Error, Result};
pub use grid::Grid;
pub use rendering::{render_grid, write_png, RenderedImage};
pub use server::GridServer;

/// Parameters of the grid renderer
///
/// The defaults produce the classic output: a 300px target width, 1px
/// gridlines and the zero color (transparent black) for the lines.
///
/// # Examples
///
/// ```
/// let cfg = gridpng::RenderConfig::default();
/// assert_eq!(cfg.image_width, 300);
/// assert_eq!(cfg.line_width, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Target image width in pixels; the real width is rounded down to a
    /// multiple of the row count, plus one border pixel
    pub image_width: u32,
    /// Gridline thickness in pixels (0 disables gridlines)
    pub line_width: u32,
    /// Color written into gridline pixels
    pub line_color: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 300,
            line_width: 1,
            line_color: Color::default(),
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,
    /// Number of worker threads pulling requests off the listener
    pub workers: usize,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Filename announced in `Content-Disposition`
    pub download_filename: String,
    pub render: RenderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            workers: num_cpus::get(),
            max_body_bytes: 10 << 20,
            download_filename: "image.png".to_string(),
            render: RenderConfig::default(),
        }
    }
}
