use crate::foundation::error::{GlyphgridError, GlyphgridResult};

/// A grid cell coordinate. Not unique per dot: a cell holds a stack of dots.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by a cell delta, saturating at the i32 range edges.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Half-open frame range `[start, end)` used for recording windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: u64,
    pub end: u64, // exclusive
}

impl FrameRange {
    pub fn new(start: u64, end: u64) -> GlyphgridResult<Self> {
        if start > end {
            return Err(GlyphgridError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, frame: u64) -> bool {
        self.start <= frame && frame < self.end
    }
}

/// Grid dimensions in cells (columns, rows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridShape {
    pub cols: u32,
    pub rows: u32,
}

impl GridShape {
    pub fn new(cols: u32, rows: u32) -> GlyphgridResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(GlyphgridError::validation("GridShape must be non-empty"));
        }
        Ok(Self { cols, rows })
    }
}

/// Pixel dimensions of a canvas or window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pixel rectangle of one grid cell on the full-resolution canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Cell size in pixels: floor of `full_res / shape` per axis.
pub fn block_size(full_res: PixelSize, shape: GridShape) -> PixelSize {
    PixelSize {
        width: (full_res.width / shape.cols).max(1),
        height: (full_res.height / shape.rows).max(1),
    }
}

/// Screen rectangle of cell `pos`: origin `(x*cell_w, y*cell_h)`.
pub fn block_rect(pos: GridPos, full_res: PixelSize, shape: GridShape) -> BlockRect {
    let cell = block_size(full_res, shape);
    BlockRect {
        x: i64::from(pos.x) * i64::from(cell.width),
        y: i64::from(pos.y) * i64::from(cell.height),
        width: cell.width,
        height: cell.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rect_origin_scales_with_cell_size() {
        let full = PixelSize::new(512, 256);
        let shape = GridShape::new(16, 8).unwrap();
        let rect = block_rect(GridPos::new(3, 2), full, shape);
        assert_eq!((rect.x, rect.y), (96, 64));
        assert_eq!((rect.width, rect.height), (32, 32));
    }

    #[test]
    fn block_size_floors_uneven_grids() {
        let cell = block_size(PixelSize::new(100, 100), GridShape::new(3, 3).unwrap());
        assert_eq!((cell.width, cell.height), (33, 33));
    }

    #[test]
    fn frame_range_contains_is_half_open() {
        let r = FrameRange::new(2, 5).unwrap();
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
    }

    #[test]
    fn frame_range_rejects_reversed_bounds() {
        assert!(FrameRange::new(5, 2).is_err());
    }
}
