//! Consumer side of the pipeline: the single-threaded frame loop that owns
//! the display, the render cache, and the canvas.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::foundation::core::{PixelSize, Rgba8, block_rect};
use crate::foundation::error::{GlyphgridError, GlyphgridResult};
use crate::protocol::{Action, ConsumerLink, EventBatch};
use crate::render::cache::RenderCache;
use crate::render::frame::{Frame, frame_filename};
use crate::render::raster::TileRasterizer;

/// Window and input capability. The toolkit never owns a windowing stack;
/// an implementation wraps whatever backend hosts the canvas.
pub trait Display {
    /// Collect input events accumulated since the last poll.
    fn poll_events(&mut self) -> EventBatch;

    /// Show the finished canvas. Scaling to the display size is the
    /// implementation's business.
    fn present(&mut self, frame: &Frame) -> GlyphgridResult<()>;
}

/// A display that shows nothing and produces only pre-scripted events.
/// Drives batch-render runs and tests.
#[derive(Default)]
pub struct HeadlessDisplay {
    scripted: VecDeque<EventBatch>,
    presented: u64,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch to be returned by a future `poll_events` call. Once the
    /// script runs out, polls return empty batches.
    pub fn script(&mut self, batch: EventBatch) {
        self.scripted.push_back(batch);
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Display for HeadlessDisplay {
    fn poll_events(&mut self) -> EventBatch {
        self.scripted.pop_front().unwrap_or_default()
    }

    fn present(&mut self, _frame: &Frame) -> GlyphgridResult<()> {
        self.presented += 1;
        Ok(())
    }
}

/// Paces a loop to a target frames-per-second by sleeping off the remainder
/// of each frame budget.
pub struct FrameClock {
    budget: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let budget = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };
        Self {
            budget,
            last: Instant::now(),
        }
    }

    /// Sleep until the current frame's budget is spent, then start the next.
    pub fn tick(&mut self) {
        let elapsed = self.last.elapsed();
        if elapsed < self.budget {
            std::thread::sleep(self.budget - elapsed);
        }
        self.last = Instant::now();
    }
}

/// Settings the frame loop needs, decoupled from config loading.
#[derive(Clone, Debug)]
pub struct AppSettings {
    pub full_res: PixelSize,
    pub shape: crate::foundation::core::GridShape,
    pub fps: u32,
    pub backcolor: Rgba8,
    /// Half-open frame range to dump as PNGs, if any.
    pub record: Option<crate::foundation::core::FrameRange>,
    /// Stop after presenting this many frames, if set.
    pub quit_at: Option<u64>,
    pub real_time: bool,
    pub out_dir: PathBuf,
}

impl AppSettings {
    pub fn from_config(
        config: &crate::project::config::ProjectConfig,
        project_dir: &std::path::Path,
    ) -> Self {
        Self {
            full_res: config.full_res,
            shape: config.shape,
            fps: config.fps,
            backcolor: config.backcolor,
            record: config.record,
            quit_at: config.quit,
            real_time: config.real_time,
            out_dir: config.resolved_out_dir(project_dir),
        }
    }
}

/// How long the consumer waits for producer actions within one frame before
/// presenting what it has.
const ACTION_TIMEOUT: Duration = Duration::from_secs(2);

/// What a finished frame loop did, returned by [`App::run`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RunSummary {
    /// Frames presented to the display.
    pub frames: u64,
    /// Render cache counters accumulated over the run.
    pub cache: crate::render::cache::CacheStats,
}

/// The consumer frame loop. Owns the canvas and the render cache; the
/// producer owns the scene and the registration seen-set.
pub struct App {
    settings: AppSettings,
    display: Box<dyn Display>,
    cache: RenderCache,
    canvas: Frame,
    link: ConsumerLink,
    frame_index: u64,
    running: bool,
}

impl App {
    pub fn new(
        settings: AppSettings,
        rasterizer: Box<dyn TileRasterizer>,
        display: Box<dyn Display>,
        link: ConsumerLink,
    ) -> Self {
        let canvas = Frame::new(settings.full_res, settings.backcolor);
        Self {
            settings,
            display,
            cache: RenderCache::new(rasterizer),
            canvas,
            link,
            frame_index: 0,
            running: true,
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn cache_stats(&self) -> crate::render::cache::CacheStats {
        self.cache.stats()
    }

    /// Run the frame loop until the producer quits, the configured quit
    /// frame is reached, or the queues close. Joins `producer` on the way
    /// out so its shutdown cannot be lost.
    pub fn run(mut self, producer: std::thread::JoinHandle<()>) -> GlyphgridResult<RunSummary> {
        if self.settings.record.is_some() {
            std::fs::create_dir_all(&self.settings.out_dir).map_err(|e| {
                GlyphgridError::config(format!(
                    "create output dir '{}': {e}",
                    self.settings.out_dir.display()
                ))
            })?;
        }

        let mut clock = FrameClock::new(self.settings.fps);
        while self.running {
            let batch = self.display.poll_events();
            // Never block the frame loop on input delivery; a stalled
            // producer just misses a batch.
            if self.link.events.try_send(batch).is_err() {
                tracing::debug!(frame = self.frame_index, "event queue full, batch dropped");
            }

            self.pump_actions()?;

            if let Some(quit_at) = self.settings.quit_at {
                if self.frame_index >= quit_at {
                    tracing::debug!(frame = self.frame_index, "quit frame reached");
                    self.running = false;
                }
            }
            if self.settings.real_time {
                clock.tick();
            }
        }

        let summary = RunSummary {
            frames: self.frame_index,
            cache: self.cache.stats(),
        };
        // Closing our ends of the queues is the producer's stop signal.
        drop(self.link);
        if producer.join().is_err() {
            return Err(GlyphgridError::protocol("producer thread panicked"));
        }
        Ok(summary)
    }

    /// Execute queued actions in order until a frame boundary.
    fn pump_actions(&mut self) -> GlyphgridResult<()> {
        loop {
            let action = match self.link.actions.recv_timeout(ACTION_TIMEOUT) {
                Ok(action) => action,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!(frame = self.frame_index, "no actions this frame");
                    return Ok(());
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("action queue closed, stopping");
                    self.running = false;
                    return Ok(());
                }
            };
            match action {
                Action::Frame(packet) => self.apply_packet(packet)?,
                Action::Clear => self.canvas.fill(self.settings.backcolor),
                Action::Present => {
                    self.present()?;
                    return Ok(());
                }
                Action::Quit => {
                    self.running = false;
                    return Ok(());
                }
            }
        }
    }

    fn apply_packet(&mut self, packet: crate::protocol::FramePacket) -> GlyphgridResult<()> {
        if packet.is_no_change() {
            return Ok(());
        }
        self.cache.register_all(packet.registrations);
        if packet.clear_screen {
            self.canvas.fill(self.settings.backcolor);
        }
        for cell in &packet.cells {
            let rect = block_rect(cell.pos, self.settings.full_res, self.settings.shape);
            for key in &cell.keys {
                let tile = self.cache.resolve(*key)?;
                self.canvas.blit(tile, rect);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> GlyphgridResult<()> {
        self.display.present(&self.canvas)?;
        if let Some(range) = self.settings.record {
            if range.contains(self.frame_index) {
                let path = self.settings.out_dir.join(frame_filename(self.frame_index));
                self.canvas.save_png(&path)?;
            }
        }
        self.frame_index += 1;
        Ok(())
    }
}
