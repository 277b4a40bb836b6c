use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{BlockRect, PixelSize, Rgba8};
use crate::foundation::error::GlyphgridResult;

/// A rasterized cell-sized bitmap, straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Tile {
    /// A tile filled with one color.
    pub fn solid(size: PixelSize, color: Rgba8) -> Self {
        let mut tile = Self {
            width: size.width,
            height: size.height,
            data: vec![0; (size.width as usize) * (size.height as usize) * 4],
        };
        tile.fill(color);
        tile
    }

    pub fn fill(&mut self, color: Rgba8) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    pub(crate) fn put_px(&mut self, x: u32, y: u32, color: Rgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) as usize) * 4;
        blend_over(&mut self.data[idx..idx + 4], color);
    }
}

/// Straight-alpha "source over" blend of `src` onto one RGBA8 pixel.
fn blend_over(dst: &mut [u8], src: Rgba8) {
    if src.a == 255 {
        dst.copy_from_slice(&[src.r, src.g, src.b, src.a]);
        return;
    }
    if src.a == 0 {
        return;
    }
    let sa = u32::from(src.a);
    let inv = 255 - sa;
    let over = |s: u8, d: u8| -> u8 { ((u32::from(s) * sa + u32::from(d) * inv) / 255) as u8 };
    dst[0] = over(src.r, dst[0]);
    dst[1] = over(src.g, dst[1]);
    dst[2] = over(src.b, dst[2]);
    dst[3] = (sa + u32::from(dst[3]) * inv / 255).min(255) as u8;
}

/// The consumer's full-resolution canvas, straight-alpha RGBA8.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(size: PixelSize, backcolor: Rgba8) -> Self {
        let mut frame = Self {
            width: size.width,
            height: size.height,
            data: vec![0; (size.width as usize) * (size.height as usize) * 4],
        };
        frame.fill(backcolor);
        frame
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub fn fill(&mut self, color: Rgba8) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Overwrite a cell rectangle with one color (used to blank cells in the
    /// diff clear set before redrawing them).
    pub fn fill_rect(&mut self, rect: BlockRect, color: Rgba8) {
        for dy in 0..rect.height {
            let y = rect.y + i64::from(dy);
            if y < 0 || y >= i64::from(self.height) {
                continue;
            }
            for dx in 0..rect.width {
                let x = rect.x + i64::from(dx);
                if x < 0 || x >= i64::from(self.width) {
                    continue;
                }
                let idx = ((y as u32 * self.width + x as u32) as usize) * 4;
                self.data[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        }
    }

    /// Alpha-blend `tile` at the cell rectangle `rect`. Off-canvas parts are
    /// clipped away.
    pub fn blit(&mut self, tile: &Tile, rect: BlockRect) {
        let w = tile.width.min(rect.width);
        let h = tile.height.min(rect.height);
        for dy in 0..h {
            let y = rect.y + i64::from(dy);
            if y < 0 || y >= i64::from(self.height) {
                continue;
            }
            for dx in 0..w {
                let x = rect.x + i64::from(dx);
                if x < 0 || x >= i64::from(self.width) {
                    continue;
                }
                let src_idx = ((dy * tile.width + dx) as usize) * 4;
                let src = Rgba8::new(
                    tile.data[src_idx],
                    tile.data[src_idx + 1],
                    tile.data[src_idx + 2],
                    tile.data[src_idx + 3],
                );
                let dst_idx = ((y as u32 * self.width + x as u32) as usize) * 4;
                blend_over(&mut self.data[dst_idx..dst_idx + 4], src);
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) as usize) * 4;
        Some(Rgba8::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ))
    }

    /// Persist the frame as a PNG (the per-frame capture format).
    pub fn save_png(&self, path: &Path) -> GlyphgridResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Screenshot filename for a frame index: `frame_NNNNN.png`.
pub fn frame_filename(frame: u64) -> String {
    format!("frame_{frame:05}.png")
}
