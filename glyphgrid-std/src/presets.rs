//! Canned instruction-list builders for common dot animations.

use glyphgrid::{AnimatedDot, DotAttr, Rgba8};
use rand::Rng as _;

/// Schedule `length` ticks of jittery horizontal drift starting `delta`
/// ticks from now. Steps are drawn from {-1, 0, 1} with movement twice as
/// likely as staying put.
pub fn random_walk_x(dot: &mut AnimatedDot, delta: u64, length: u64) {
    let mut rng = rand::thread_rng();
    const STEPS: [i32; 5] = [-1, -1, 0, 1, 1];
    for i in 0..length {
        let x = STEPS[rng.gen_range(0..STEPS.len())];
        dot.op_move(delta + i, (x, 0), 1);
    }
}

/// Fade through `colors` starting `delta` ticks from now, hold, then fade
/// back so the last reversed step lands `length` ticks after the start.
pub fn fade_in_fade_out(dot: &mut AnimatedDot, delta: u64, length: u64, colors: &[Rgba8]) {
    let ramp = colors.len() as u64;
    dot.op_set_seq(delta, colors.iter().map(|&c| DotAttr::Color(c)));
    dot.op_set_seq(
        delta + length.saturating_sub(ramp),
        colors.iter().rev().map(|&c| DotAttr::Color(c)),
    );
}

/// Cycle the dot's letter through `text` one tick at a time, then stop the
/// dot once the last letter has shown.
pub fn spell_and_stop(dot: &mut AnimatedDot, delta: u64, text: &str) {
    let count = text.chars().count() as u64;
    dot.op_set_seq(delta, text.chars().map(DotAttr::Letter));
    dot.op_stop(delta + count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphgrid::{Dot, FontRef};

    fn dot() -> AnimatedDot {
        AnimatedDot::new(Dot::new((0, 0), 'a', Rgba8::WHITE, FontRef::new("mono", 8)))
    }

    #[test]
    fn spell_and_stop_spells_then_dies() {
        let mut d = dot();
        spell_and_stop(&mut d, 0, "hi");
        assert!(d.advance());
        assert_eq!(d.dot.letter, 'h');
        assert!(d.advance());
        assert_eq!(d.dot.letter, 'i');
        assert!(!d.advance(), "stop lands right after the last letter");
    }

    #[test]
    fn fade_in_fade_out_ends_on_the_first_color() {
        let red = Rgba8 {
            r: 255,
            g: 0,
            b: 0,
            a: 255,
        };
        let mut d = dot();
        fade_in_fade_out(&mut d, 0, 6, &[Rgba8::BLACK, red, Rgba8::WHITE]);
        for _ in 0..7 {
            d.advance();
        }
        assert_eq!(d.dot.color, Rgba8::BLACK);
    }

    #[test]
    fn random_walk_x_never_leaves_the_row() {
        let mut d = dot();
        random_walk_x(&mut d, 0, 20);
        for _ in 0..20 {
            d.advance();
            if let Some(pos) = d.pending_pos() {
                assert_eq!(pos.y, 0);
                assert!(pos.x.abs() <= 20);
            }
        }
    }
}
