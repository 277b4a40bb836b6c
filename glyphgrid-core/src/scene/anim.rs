use crate::foundation::core::{GridPos, Rgba8};
use crate::scene::buffer::Buffer;
use crate::scene::dot::{Align, Dot, FontRef};

/// A single mutable attribute of a [`Dot`], as targeted by [`AnimOp::Set`].
///
/// A closed enum rather than field-name reflection: an instruction can only
/// ever touch fields that exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DotAttr {
    Letter(char),
    Color(Rgba8),
    Backcolor(Option<Rgba8>),
    Font(FontRef),
    Clear(bool),
    Align(Align),
}

impl DotAttr {
    fn apply(self, dot: &mut Dot) {
        match self {
            Self::Letter(letter) => dot.letter = letter,
            Self::Color(color) => dot.color = color,
            Self::Backcolor(backcolor) => dot.backcolor = backcolor,
            Self::Font(font) => dot.font = font,
            Self::Clear(clear) => dot.clear = clear,
            Self::Align(align) => dot.align = align,
        }
    }
}

/// One animation instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnimOp {
    /// Mutate one attribute of the dot.
    Set(DotAttr),
    /// Halt advancement. Terminal: the dot reports not-alive this tick.
    Stop,
    /// Relocate the instruction pointer to the first instruction scheduled at
    /// or before the target frame, and reset the frame counter to it.
    Jmp(u64),
    /// Stage a relative cell move, applied by the owning buffer at end of tick.
    Move(i32, i32),
    /// Stage an absolute cell move.
    MoveTo(GridPos),
}

/// An [`AnimOp`] with the frame counter value it is due at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledOp {
    pub frame: u64,
    pub op: AnimOp,
}

/// A dot with a frame-driven instruction list.
///
/// Instructions are kept sorted ascending by scheduled frame; ties keep
/// insertion order (a new instruction lands after every existing one due at
/// the same frame).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimatedDot {
    pub dot: Dot,
    instructions: Vec<ScheduledOp>,
    frame_counter: u64,
    instruction_pointer: usize,
    new_pos: Option<GridPos>,
}

impl AnimatedDot {
    pub fn new(dot: Dot) -> Self {
        Self {
            dot,
            instructions: Vec::new(),
            frame_counter: 0,
            instruction_pointer: 0,
            new_pos: None,
        }
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn instructions(&self) -> &[ScheduledOp] {
        &self.instructions
    }

    /// Staged position change, if any instruction moved the dot this tick.
    pub fn pending_pos(&self) -> Option<GridPos> {
        self.new_pos
    }

    /// Drop all instructions and reset counters.
    pub fn clear_state(&mut self) {
        self.instructions.clear();
        self.frame_counter = 0;
        self.instruction_pointer = 0;
        self.new_pos = None;
    }

    fn add_op(&mut self, frame: u64, op: AnimOp) {
        let idx = self.instructions.partition_point(|s| s.frame <= frame);
        self.instructions.insert(idx, ScheduledOp { frame, op });
    }

    /// Schedule a single attribute mutation `delta` frames from now.
    pub fn op_set(&mut self, delta: u64, attr: DotAttr) {
        self.add_op(self.frame_counter + delta, AnimOp::Set(attr));
    }

    /// Schedule one attribute mutation per value at consecutive frames,
    /// spreading a value sequence over time (e.g. a color fade).
    pub fn op_set_seq(&mut self, delta: u64, attrs: impl IntoIterator<Item = DotAttr>) {
        for (i, attr) in attrs.into_iter().enumerate() {
            self.add_op(self.frame_counter + delta + i as u64, AnimOp::Set(attr));
        }
    }

    /// Schedule a halt `delta` frames from now.
    pub fn op_stop(&mut self, delta: u64) {
        self.add_op(self.frame_counter + delta, AnimOp::Stop);
    }

    /// Schedule a jump: at `delta` frames from now, rewind (or fast-forward)
    /// the animation to `dst_delta` frames from now, clamped at frame 0.
    /// A jump to an earlier frame with no STOP in range loops forever.
    pub fn op_jmp(&mut self, delta: u64, dst_delta: i64) {
        let op_time = self.frame_counter + delta;
        let dst = (self.frame_counter as i64).saturating_add(dst_delta).max(0) as u64;
        self.add_op(op_time, AnimOp::Jmp(dst));
    }

    /// Schedule a relative move, optionally repeated on consecutive frames.
    pub fn op_move(&mut self, delta: u64, vector: (i32, i32), repeat: u64) {
        let op_time = self.frame_counter + delta;
        for i in 0..repeat.max(1) {
            self.add_op(op_time + i, AnimOp::Move(vector.0, vector.1));
        }
    }

    /// Schedule an absolute move.
    pub fn op_move_to(&mut self, delta: u64, pos: impl Into<GridPos>) {
        self.add_op(self.frame_counter + delta, AnimOp::MoveTo(pos.into()));
    }

    fn pointer_for_frame(&self, frame: u64) -> usize {
        self.instructions
            .iter()
            .position(|s| s.frame <= frame)
            .unwrap_or(self.instructions.len())
    }

    /// Advance one tick: execute every instruction due at the current frame
    /// counter, then increment the counter. Returns whether the dot is still
    /// alive (false exactly on the tick a `Stop` executes).
    ///
    /// A pointer past the end of the list means idle, not dead.
    pub fn advance(&mut self) -> bool {
        let mut alive = true;
        while alive {
            let Some(sched) = self.instructions.get(self.instruction_pointer) else {
                break;
            };
            if self.frame_counter < sched.frame {
                break;
            }
            match sched.op.clone() {
                AnimOp::Stop => alive = false,
                AnimOp::Set(attr) => attr.apply(&mut self.dot),
                AnimOp::Jmp(target) => {
                    self.frame_counter = target;
                    self.instruction_pointer = self.pointer_for_frame(target);
                    continue;
                }
                AnimOp::Move(dx, dy) => {
                    let base = self.new_pos.unwrap_or(self.dot.pos);
                    self.new_pos = Some(base.offset(dx, dy));
                }
                AnimOp::MoveTo(pos) => self.new_pos = Some(pos),
            }
            self.instruction_pointer += 1;
        }
        self.frame_counter += 1;
        alive
    }

    fn take_pending_pos(&mut self) -> Option<GridPos> {
        self.new_pos.take()
    }
}

/// A scene buffer that also owns the animated subset of its dots.
///
/// Static dots go through [`AnimatedBuffer::put`]; animated dots through
/// [`AnimatedBuffer::put_animated`], which mirrors their current appearance
/// into the underlying buffer. One [`AnimatedBuffer::advance`] call per frame
/// keeps the two in sync.
#[derive(Clone, Debug, Default)]
pub struct AnimatedBuffer {
    buffer: Buffer,
    animated: Vec<AnimatedDot>,
    counter: u64,
}

impl AnimatedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks advanced so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// The renderable view: static dots plus the current appearance of every
    /// animated dot.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn animated_count(&self) -> usize {
        self.animated.len()
    }

    pub fn put(&mut self, dot: Dot) {
        self.buffer.put(dot);
    }

    pub fn put_animated(&mut self, animated: AnimatedDot) {
        self.buffer.put(animated.dot.clone());
        self.animated.push(animated);
    }

    pub fn erase(&mut self, dot: &Dot) {
        self.buffer.erase(dot);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.animated.clear();
    }

    /// Advance every animated dot one tick.
    ///
    /// Dots reporting not-alive are removed from both the animated list and
    /// the buffer; dots whose appearance or cell changed are erased at their
    /// old state and re-put at the new one. Survivors are collected in a
    /// single pass, so removals cannot shift later indices.
    pub fn advance(&mut self) {
        let mut survivors = Vec::with_capacity(self.animated.len());
        for mut animated in self.animated.drain(..) {
            let before = animated.dot.clone();
            let alive = animated.advance();
            if !alive {
                self.buffer.erase(&before);
                continue;
            }
            if let Some(new_pos) = animated.take_pending_pos() {
                animated.dot = animated.dot.with_pos(new_pos);
            }
            if animated.dot != before {
                self.buffer.erase(&before);
                self.buffer.put(animated.dot.clone());
            }
            survivors.push(animated);
        }
        self.animated = survivors;
        self.counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(pos: (i32, i32), letter: char) -> Dot {
        Dot::new(pos, letter, Rgba8::WHITE, FontRef::new("mono", 8))
    }

    #[test]
    fn ties_at_one_frame_keep_insertion_order() {
        let mut animated = AnimatedDot::new(dot((0, 0), 'A'));
        animated.op_set(1, DotAttr::Letter('X'));
        animated.op_set(0, DotAttr::Letter('E'));
        animated.op_set(1, DotAttr::Letter('Y'));
        animated.op_set(1, DotAttr::Letter('Z'));

        let frames: Vec<u64> = animated.instructions().iter().map(|s| s.frame).collect();
        assert_eq!(frames, vec![0, 1, 1, 1]);
        let letters: Vec<char> = animated
            .instructions()
            .iter()
            .filter_map(|s| match &s.op {
                AnimOp::Set(DotAttr::Letter(c)) => Some(*c),
                _ => None,
            })
            .collect();
        // The later insertions land after existing ops due at the same frame.
        assert_eq!(letters, vec!['E', 'X', 'Y', 'Z']);

        // All three frame-1 sets execute on the same tick, last writer wins.
        assert!(animated.advance());
        assert!(animated.advance());
        assert_eq!(animated.dot.letter, 'Z');
    }

    #[test]
    fn set_seq_spreads_values_over_consecutive_frames() {
        let mut animated = AnimatedDot::new(dot((0, 0), '.'));
        animated.op_set_seq(0, "AB".chars().map(DotAttr::Letter));

        assert!(animated.advance());
        assert_eq!(animated.dot.letter, 'A');
        assert!(animated.advance());
        assert_eq!(animated.dot.letter, 'B');
        // Further ticks idle without dying.
        assert!(animated.advance());
        assert_eq!(animated.dot.letter, 'B');
    }

    #[test]
    fn jmp_loop_never_halts_and_position_cycles() {
        // SET(0, letter, "AB"); MOVE(1, (1, 0)); JMP(2, 0)
        let mut buffer = AnimatedBuffer::new();
        let mut animated = AnimatedDot::new(dot((0, 0), '.'));
        animated.op_set_seq(0, "AB".chars().map(DotAttr::Letter));
        animated.op_move(1, (1, 0), 1);
        animated.op_jmp(2, 0);
        buffer.put_animated(animated);

        let mut xs = Vec::new();
        for _ in 0..10 {
            buffer.advance();
            assert_eq!(buffer.animated_count(), 1, "JMP loop must stay alive");
            xs.push(buffer.buffer().dot_seq().next().unwrap().pos.x);
        }
        // The move fires on every second tick: x advances with period 2.
        assert_eq!(xs, vec![0, 1, 1, 2, 2, 3, 3, 4, 4, 5]);
    }

    #[test]
    fn stop_kills_on_the_exact_tick_and_removes_from_buffer() {
        let stop_frame = 3u64;
        let mut buffer = AnimatedBuffer::new();
        let mut animated = AnimatedDot::new(dot((1, 1), 'S'));
        animated.op_stop(stop_frame);
        buffer.put_animated(animated);

        for tick in 0..stop_frame {
            buffer.advance();
            assert_eq!(buffer.animated_count(), 1, "alive before stop (tick {tick})");
            assert!(!buffer.buffer().is_empty());
        }
        buffer.advance();
        assert_eq!(buffer.animated_count(), 0);
        assert!(buffer.buffer().is_empty());
    }

    #[test]
    fn moved_dot_is_reinserted_at_its_new_cell() {
        let mut buffer = AnimatedBuffer::new();
        let mut animated = AnimatedDot::new(dot((2, 3), 'M'));
        animated.op_move_to(0, (5, 5));
        buffer.put_animated(animated);

        buffer.advance();
        assert!(buffer.buffer().get_top(GridPos::new(2, 3)).is_none());
        assert_eq!(buffer.buffer().get_top(GridPos::new(5, 5)).unwrap().letter, 'M');
    }

    #[test]
    fn moves_on_one_tick_accumulate() {
        let mut animated = AnimatedDot::new(dot((0, 0), 'M'));
        animated.op_move(0, (1, 0), 1);
        animated.op_move(0, (0, 2), 1);

        assert!(animated.advance());
        assert_eq!(animated.pending_pos(), Some(GridPos::new(1, 2)));
    }

    #[test]
    fn dead_dots_are_dropped_without_disturbing_survivors() {
        let mut buffer = AnimatedBuffer::new();
        for (i, stop) in [(0, true), (1, false), (2, true), (3, false)] {
            let mut animated = AnimatedDot::new(dot((i, 0), 'x'));
            if stop {
                animated.op_stop(0);
            }
            buffer.put_animated(animated);
        }

        buffer.advance();
        assert_eq!(buffer.animated_count(), 2);
        let survivors: Vec<i32> = buffer.buffer().mask().map(|p| p.x).collect();
        assert_eq!(survivors, vec![1, 3]);
    }

    #[test]
    fn jmp_target_clamps_at_frame_zero() {
        let mut animated = AnimatedDot::new(dot((0, 0), 'J'));
        animated.op_jmp(1, -10);
        let target = animated
            .instructions()
            .iter()
            .find_map(|s| match s.op {
                AnimOp::Jmp(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(target, 0);
    }
}
