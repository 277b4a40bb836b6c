use crate::foundation::core::{PixelSize, Rgba8};
use crate::foundation::error::{GlyphgridError, GlyphgridResult};
use crate::project::fonts::FontBank;
use crate::render::frame::Tile;
use crate::scene::dot::{Align, Dot};

/// The rasterization capability the render cache calls into.
///
/// Implementations turn one dot into a cell-sized tile. The cache guarantees
/// position independence by construction: a rasterizer only ever sees the
/// dot's visual attributes.
pub trait TileRasterizer: Send {
    fn rasterize(&mut self, dot: &Dot) -> GlyphgridResult<Tile>;

    /// Cell size of the tiles this rasterizer produces.
    fn block(&self) -> PixelSize;
}

/// The tile background a dot asks for:
/// - explicit backcolor wins;
/// - a clearing dot without one paints the global backcolor;
/// - a non-clearing dot without one stays transparent and layers on top.
pub(crate) fn resolve_backcolor(dot: &Dot, global: Rgba8) -> Rgba8 {
    match dot.backcolor {
        Some(color) => color,
        None if dot.clear => global,
        None => Rgba8::TRANSPARENT,
    }
}

/// Fontless rasterizer: background per the dot's clear/backcolor rules, glyph
/// approximated as a centered solid square. Used in tests and as the fallback
/// when a project configures no fonts.
pub struct SolidRasterizer {
    block: PixelSize,
    backcolor: Rgba8,
}

impl SolidRasterizer {
    pub fn new(block: PixelSize, backcolor: Rgba8) -> Self {
        Self { block, backcolor }
    }
}

impl TileRasterizer for SolidRasterizer {
    fn rasterize(&mut self, dot: &Dot) -> GlyphgridResult<Tile> {
        let mut tile = Tile::solid(self.block, resolve_backcolor(dot, self.backcolor));
        if !dot.letter.is_whitespace() {
            let w = (self.block.width / 2).max(1);
            let h = (self.block.height / 2).max(1);
            let x0 = (self.block.width - w) / 2;
            let y0 = (self.block.height - h) / 2;
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    tile.put_px(x, y, dot.color);
                }
            }
        }
        Ok(tile)
    }

    fn block(&self) -> PixelSize {
        self.block
    }
}

/// fontdue-backed rasterizer: renders the dot's letter at its `FontRef` size
/// and composites the coverage bitmap into the cell, tinted with the dot's
/// color and aligned per its alignment mode.
pub struct FontRasterizer {
    bank: FontBank,
    block: PixelSize,
    backcolor: Rgba8,
}

impl FontRasterizer {
    pub fn new(bank: FontBank, block: PixelSize, backcolor: Rgba8) -> Self {
        Self {
            bank,
            block,
            backcolor,
        }
    }
}

impl TileRasterizer for FontRasterizer {
    fn rasterize(&mut self, dot: &Dot) -> GlyphgridResult<Tile> {
        let font = self.bank.get(&dot.font.family).ok_or_else(|| {
            GlyphgridError::config(format!(
                "dot references unloaded font family '{}'",
                dot.font.family
            ))
        })?;

        let mut tile = Tile::solid(self.block, resolve_backcolor(dot, self.backcolor));
        if dot.letter.is_whitespace() {
            return Ok(tile);
        }

        let px = dot.font.size.max(1) as f32;
        let (metrics, coverage) = font.rasterize(dot.letter, px);
        let glyph_w = metrics.width as u32;
        let glyph_h = metrics.height as u32;

        let x0 = match dot.align {
            Align::Center => (i64::from(self.block.width) - i64::from(glyph_w)) / 2,
            Align::Start => 0,
            Align::End => i64::from(self.block.width) - i64::from(glyph_w),
        };
        let y0 = (i64::from(self.block.height) - i64::from(glyph_h)) / 2;

        for gy in 0..glyph_h {
            let y = y0 + i64::from(gy);
            if y < 0 {
                continue;
            }
            for gx in 0..glyph_w {
                let x = x0 + i64::from(gx);
                if x < 0 {
                    continue;
                }
                let cov = coverage[(gy * glyph_w + gx) as usize];
                if cov == 0 {
                    continue;
                }
                let alpha = (u32::from(cov) * u32::from(dot.color.a) / 255) as u8;
                tile.put_px(
                    x as u32,
                    y as u32,
                    Rgba8::new(dot.color.r, dot.color.g, dot.color.b, alpha),
                );
            }
        }
        Ok(tile)
    }

    fn block(&self) -> PixelSize {
        self.block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::dot::FontRef;

    fn dot(letter: char) -> Dot {
        Dot::new((0, 0), letter, Rgba8::WHITE, FontRef::new("mono", 8))
    }

    #[test]
    fn clear_dot_without_backcolor_gets_the_global_backcolor() {
        let global = Rgba8::opaque(10, 20, 30);
        assert_eq!(resolve_backcolor(&dot('A'), global), global);
    }

    #[test]
    fn layering_dot_without_backcolor_stays_transparent() {
        let d = dot('A').with_clear(false);
        assert_eq!(resolve_backcolor(&d, Rgba8::BLACK), Rgba8::TRANSPARENT);
    }

    #[test]
    fn explicit_backcolor_wins_over_both_policies() {
        let bc = Rgba8::opaque(1, 2, 3);
        let d = dot('A').with_backcolor(Some(bc));
        assert_eq!(resolve_backcolor(&d, Rgba8::WHITE), bc);
        let d = d.with_clear(false);
        assert_eq!(resolve_backcolor(&d, Rgba8::WHITE), bc);
    }

    #[test]
    fn solid_rasterizer_marks_non_whitespace_letters() {
        let mut raster = SolidRasterizer::new(PixelSize::new(4, 4), Rgba8::BLACK);
        let tile = raster.rasterize(&dot('A')).unwrap();
        let center = ((2 * 4 + 2) as usize) * 4;
        assert_eq!(&tile.data[center..center + 4], &[255, 255, 255, 255]);

        let blank = raster.rasterize(&dot(' ')).unwrap();
        assert_eq!(&blank.data[center..center + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn missing_font_family_is_a_config_error() {
        let mut raster = FontRasterizer::new(FontBank::new(), PixelSize::new(4, 4), Rgba8::BLACK);
        let err = raster.rasterize(&dot('A')).unwrap_err();
        assert!(matches!(err, GlyphgridError::Config(_)));
    }
}
