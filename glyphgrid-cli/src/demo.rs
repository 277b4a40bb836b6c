//! The bundled demo scene: a ring of dots, a title line that types itself
//! out, and a scrolling ticker along the bottom row.

use glyphgrid::{
    AnimatedBuffer, AnimatedDot, Callback, Dot, FontRef, GlyphgridResult, GridShape, Rgba8,
    SceneCtx,
};
use glyphgrid_std::{circle_seq, scroll, spell_and_stop, words_line};

const TITLE: &str = "glyphgrid";
const TICKER: &str = "dots all the way down ... ";

pub struct DemoScene {
    shape: GridShape,
    font: FontRef,
    scene: AnimatedBuffer,
    ticker_views: Vec<String>,
    max_ticks: u64,
}

impl DemoScene {
    pub fn new(shape: GridShape, font: FontRef, max_ticks: u64) -> Self {
        Self {
            shape,
            font,
            scene: AnimatedBuffer::new(),
            ticker_views: scroll(TICKER, shape.cols as usize, 0),
            max_ticks,
        }
    }

    fn ring_color(i: usize) -> Rgba8 {
        let t = (i % 8) as u8;
        Rgba8 {
            r: 64 + t * 24,
            g: 200 - t * 16,
            b: 255 - t * 8,
            a: 255,
        }
    }
}

impl Callback for DemoScene {
    fn setup(&mut self, _ctx: &mut SceneCtx) -> GlyphgridResult<()> {
        let cx = self.shape.cols as i32 / 2;
        let cy = self.shape.rows as i32 / 2;
        let radius = (self.shape.rows / 3).max(1);

        for (i, pos) in circle_seq((cx, cy), radius).into_iter().enumerate() {
            self.scene.put(Dot::new(
                pos,
                '*',
                Self::ring_color(i),
                self.font.clone(),
            ));
        }

        let title_x = cx - TITLE.len() as i32 / 2;
        for (pos, letter) in words_line(TITLE, (title_x, 1)) {
            let mut animated =
                AnimatedDot::new(Dot::new(pos, ' ', Rgba8::WHITE, self.font.clone()));
            // Each column starts typing a little later than the one before.
            let delay = (pos.x - title_x) as u64;
            spell_and_stop(&mut animated, delay, &letter.to_string());
            self.scene.put_animated(animated);
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneCtx) -> GlyphgridResult<()> {
        if ctx.updates() >= self.max_ticks {
            ctx.quit();
            return Ok(());
        }

        self.scene.advance();

        let mut frame = self.scene.buffer().clone();
        let view = &self.ticker_views[ctx.updates() as usize % self.ticker_views.len()];
        let ticker_row = self.shape.rows as i32 - 1;
        for (pos, letter) in words_line(view, (0, ticker_row)) {
            frame.put(Dot::new(
                pos,
                letter,
                Rgba8 {
                    r: 160,
                    g: 160,
                    b: 160,
                    a: 255,
                },
                self.font.clone(),
            ));
        }

        ctx.draw(&frame);
        ctx.present();
        Ok(())
    }
}
