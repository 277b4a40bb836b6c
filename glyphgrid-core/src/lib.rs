//! Glyphgrid is a grid-based text animation toolkit.
//!
//! Scenes are sparse stacks of glyph "dots" on a logical grid (`Buffer`),
//! animated per tick by small instruction lists (`AnimatedDot`,
//! `AnimatedBuffer`). A producer thread runs user scene logic
//! (`CallbackHost`) and streams compact frame packets over queues to a
//! consumer frame loop (`App`) that rasterizes each distinct dot exactly
//! once (`RenderCache`) and blits tiles onto a full-resolution canvas.
//!
//! # Pipeline overview
//!
//! 1. **Animate**: `AnimatedBuffer::advance` steps every live dot's
//!    instruction list and updates the scene buffer.
//! 2. **Encode**: `encode_buffer` flattens the buffer into a `FramePacket`
//!    of content keys, registering unseen dots exactly once.
//! 3. **Render**: the consumer resolves keys through the `RenderCache` and
//!    blits block-sized tiles at grid rects.
//! 4. **Capture** (optional): finished frames are dumped as numbered PNGs
//!    for ffmpeg stitching.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Threads + queues**: producer and consumer share no mutable state;
//!   every hand-off is a channel message.
//! - **Registrations precede references**: a packet carries the definition
//!   of every key it mentions before any cell references it.
#![forbid(unsafe_code)]

pub mod app;
pub mod callback;
pub mod foundation;
pub mod project;
pub mod protocol;
pub mod render;
pub mod scene;

pub use app::{App, AppSettings, Display, FrameClock, HeadlessDisplay, RunSummary};
pub use callback::{Callback, CallbackHost, EventRouter, HandlerFn, SceneCtx};
pub use foundation::core::{
    BlockRect, FrameRange, GridPos, GridShape, PixelSize, Rgba8, block_rect, block_size,
};
pub use foundation::error::{GlyphgridError, GlyphgridResult};
pub use project::config::{FontSpec, ProjectConfig, load_project, scaffold_project};
pub use project::fonts::FontBank;
pub use protocol::{
    Action, ConsumerLink, DotRegistry, EventBatch, EventCategory, FramePacket, InputEvent,
    ProducerLink, WireCell, encode_buffer, link,
};
pub use render::cache::{CacheStats, RenderCache};
pub use render::frame::{Frame, Tile, frame_filename};
pub use render::raster::{FontRasterizer, SolidRasterizer, TileRasterizer};
pub use scene::anim::{AnimOp, AnimatedBuffer, AnimatedDot, DotAttr, ScheduledOp};
pub use scene::buffer::Buffer;
pub use scene::dot::{Align, Dot, DotKey, FontRef};
