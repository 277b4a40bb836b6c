use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{GridPos, Rgba8};

/// Reference to an entry in the project's font manifest: a family name plus a
/// point size loaded for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FontRef {
    pub family: String,
    pub size: u32,
}

impl FontRef {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Horizontal placement of the glyph within its cell rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Align {
    #[default]
    Center,
    Start,
    End,
}

/// Content key of a dot: a hash over every visual attribute EXCEPT position.
///
/// Dots at different cells with identical appearance share one key, and
/// therefore one cached tile on the consumer side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DotKey(pub u64);

/// One cell's visual content: a character plus its colors, font and flags.
///
/// Dots are value-like. They are never mutated in place by scene code; edits
/// go through the `with_*` builders, which return a new dot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dot {
    pub pos: GridPos,
    pub letter: char,
    pub color: Rgba8,
    pub backcolor: Option<Rgba8>,
    pub font: FontRef,
    /// When set, `Buffer::put` wipes the cell's stack before appending.
    pub clear: bool,
    pub align: Align,
}

impl Dot {
    pub fn new(pos: impl Into<GridPos>, letter: char, color: Rgba8, font: FontRef) -> Self {
        Self {
            pos: pos.into(),
            letter,
            color,
            backcolor: None,
            font,
            clear: true,
            align: Align::Center,
        }
    }

    pub fn with_pos(mut self, pos: impl Into<GridPos>) -> Self {
        self.pos = pos.into();
        self
    }

    pub fn with_letter(mut self, letter: char) -> Self {
        self.letter = letter;
        self
    }

    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }

    pub fn with_backcolor(mut self, backcolor: Option<Rgba8>) -> Self {
        self.backcolor = backcolor;
        self
    }

    pub fn with_font(mut self, font: FontRef) -> Self {
        self.font = font;
        self
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// True when every attribute except `pos` matches: the dots are the same
    /// visual content and are interchangeable in the render cache.
    pub fn same_content(&self, other: &Dot) -> bool {
        self.letter == other.letter
            && self.color == other.color
            && self.backcolor == other.backcolor
            && self.font == other.font
            && self.clear == other.clear
            && self.align == other.align
    }

    /// Position-independent content hash (xxh3 over a canonical byte
    /// encoding of the non-`pos` fields).
    pub fn content_key(&self) -> DotKey {
        fn write_color(h: &mut Xxh3, c: Rgba8) {
            h.update(&[c.r, c.g, c.b, c.a]);
        }

        let mut h = Xxh3::new();
        h.update(&(self.letter as u32).to_le_bytes());
        write_color(&mut h, self.color);
        match self.backcolor {
            Some(c) => {
                h.update(&[1]);
                write_color(&mut h, c);
            }
            None => h.update(&[0]),
        }
        h.update(&(self.font.family.len() as u64).to_le_bytes());
        h.update(self.font.family.as_bytes());
        h.update(&self.font.size.to_le_bytes());
        h.update(&[u8::from(self.clear)]);
        h.update(&[match self.align {
            Align::Center => 0,
            Align::Start => 1,
            Align::End => 2,
        }]);
        DotKey(h.digest())
    }
}
