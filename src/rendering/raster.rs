/// RGBA canvas, display list execution and PNG encoding

use std::io::Write;

use super::layout::Rect;
use super::paint::PaintCommand;
use crate::{Color, Result};

/// Owned RGBA8 pixel buffer, initialised to the zero color.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            rgba: vec![0u8; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Overwrite every pixel of `rect` that lies on the canvas with `color`.
    /// No blending: the alpha channel is stored as given.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.x.min(self.width) as usize;
        let x1 = rect.right().min(self.width) as usize;
        let y0 = rect.y.min(self.height) as usize;
        let y1 = rect.bottom().min(self.height) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let px = color.to_array();
        let stride = self.width as usize * 4;
        for y in y0..y1 {
            let row = &mut self.rgba[y * stride + x0 * 4..y * stride + x1 * 4];
            for dst in row.chunks_exact_mut(4) {
                dst.copy_from_slice(&px);
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.rgba[idx..idx + 4]);
        Some(Color::from_array(px))
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn encode_png<W: Write>(&self, writer: W) -> Result<()> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgba)?;
        writer.finish()?;
        Ok(())
    }
}

/// Execute `commands` in order on a fresh `size × size` canvas.
pub fn rasterize(commands: &[PaintCommand], size: u32) -> Canvas {
    let mut canvas = Canvas::new(size, size);
    for cmd in commands {
        canvas.fill_rect(cmd.rect(), cmd.color());
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_clipped_to_bounds() {
        let mut c = Canvas::new(4, 3);
        c.fill_rect(Rect { x: 2, y: 1, width: 10, height: 10 }, Color::rgba(9, 8, 7, 6));
        assert_eq!(c.pixel(3, 2), Some(Color::rgba(9, 8, 7, 6)));
        assert_eq!(c.pixel(1, 1), Some(Color::default()));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn fill_rect_replaces_without_blending() {
        let mut c = Canvas::new(2, 2);
        let r = Rect { x: 0, y: 0, width: 2, height: 2 };
        c.fill_rect(r, Color::rgba(255, 255, 255, 255));
        c.fill_rect(r, Color::rgba(10, 20, 30, 0));
        assert_eq!(c.pixel(1, 1), Some(Color::rgba(10, 20, 30, 0)));
    }

    #[test]
    fn rasterize_applies_commands_in_order() {
        let rect = Rect { x: 0, y: 0, width: 3, height: 3 };
        let cmds = vec![
            PaintCommand::GridLine { rect, color: Color::rgba(1, 1, 1, 1) },
            PaintCommand::GridLine { rect, color: Color::rgba(2, 2, 2, 2) },
        ];
        let c = rasterize(&cmds, 3);
        assert_eq!(c.width(), 3);
        assert_eq!(c.pixel(2, 2), Some(Color::rgba(2, 2, 2, 2)));
    }

    #[test]
    fn encode_png_writes_signature() {
        let c = Canvas::new(8, 8);
        let mut out = Vec::new();
        c.encode_png(&mut out).unwrap();
        assert_eq!(&out[0..8], b"\x89PNG\r\n\x1a\n");
    }
}
