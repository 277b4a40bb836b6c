//! `glyphgrid-std` provides higher-level helpers on top of the `glyphgrid`
//! scene and animation API.
//!
//! The goal is to keep `glyphgrid` focused on the buffer, protocol and
//! render pipeline, while `glyphgrid-std` layers conveniences: dot-sequence
//! generators for geometric shapes, text layout helpers, and canned
//! animation presets.

#![forbid(unsafe_code)]

pub mod presets;
pub mod shapes;
pub mod text;

pub use presets::{fade_in_fade_out, random_walk_x, spell_and_stop};
pub use shapes::{circle_seq, grid_seq, line_seq, polygon_seq};
pub use text::{reveal, scroll, words_bound, words_line};
