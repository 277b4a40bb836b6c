use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::GridPos;
use crate::scene::dot::Dot;

/// Sparse mapping from grid cell to an ordered stack of dots.
///
/// Stack order is paint order (back to front). A cell whose stack empties is
/// removed from the map, so "present with empty stack" never escapes this
/// type. Cell iteration order is the map's key order, which is stable for a
/// given buffer instance.
///
/// All lookups on missing cells or out-of-range indices are silent no-ops:
/// scene scripts edit freely without checking buffer state first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buffer {
    container: BTreeMap<GridPos, Vec<Dot>>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dots(dots: impl IntoIterator<Item = Dot>) -> Self {
        let mut buffer = Self::new();
        buffer.extend(dots);
        buffer
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.container.len()
    }

    /// Insert `dot` into the stack at `dot.pos`.
    ///
    /// Clear-then-append policy: a dot with the `clear` flag set, or with an
    /// explicit backcolor, resets the cell before it is appended. Dots
    /// without either layer transparently on top of the existing stack.
    pub fn put(&mut self, dot: Dot) {
        let local = self.container.entry(dot.pos).or_default();
        if dot.clear || dot.backcolor.is_some() {
            local.clear();
        }
        local.push(dot);
    }

    pub fn extend(&mut self, dots: impl IntoIterator<Item = Dot>) {
        for dot in dots {
            self.put(dot);
        }
    }

    pub fn get_at(&self, pos: GridPos, idx: usize) -> Option<&Dot> {
        self.container.get(&pos).and_then(|local| local.get(idx))
    }

    /// Topmost dot of the cell, if any.
    pub fn get_top(&self, pos: GridPos) -> Option<&Dot> {
        self.container.get(&pos).and_then(|local| local.last())
    }

    /// Remove the first dot equal to `dot` from its cell's stack.
    pub fn erase(&mut self, dot: &Dot) {
        if let Some(local) = self.container.get_mut(&dot.pos) {
            if let Some(idx) = local.iter().position(|d| d == dot) {
                local.remove(idx);
            }
            if local.is_empty() {
                self.container.remove(&dot.pos);
            }
        }
    }

    /// Remove the dot at stack index `idx` of cell `pos`.
    pub fn erase_at(&mut self, pos: GridPos, idx: usize) {
        if let Some(local) = self.container.get_mut(&pos) {
            if idx < local.len() {
                local.remove(idx);
            }
            if local.is_empty() {
                self.container.remove(&pos);
            }
        }
    }

    /// Remove the topmost dot of cell `pos`.
    pub fn erase_top(&mut self, pos: GridPos) {
        if let Some(local) = self.container.get_mut(&pos) {
            local.pop();
            if local.is_empty() {
                self.container.remove(&pos);
            }
        }
    }

    pub fn clear(&mut self) {
        self.container.clear();
    }

    pub fn clear_at(&mut self, pos: GridPos) {
        self.container.remove(&pos);
    }

    /// Replace the dot at `(pos, idx)` with an edited copy.
    ///
    /// The closure receives the current dot and returns its replacement; the
    /// replacement keeps the original cell regardless of the `pos` it claims.
    pub fn edit_at(&mut self, pos: GridPos, idx: usize, edit: impl FnOnce(Dot) -> Dot) {
        if let Some(local) = self.container.get_mut(&pos) {
            if let Some(slot) = local.get_mut(idx) {
                let edited = edit(slot.clone()).with_pos(pos);
                *slot = edited;
            }
        }
    }

    /// Re-apply every dot of `other` through [`Buffer::put`].
    ///
    /// Not a raw union: dots in `other` that carry the clear flag (or a
    /// backcolor) wipe whatever `self` held at their cell.
    pub fn merge(&mut self, other: &Buffer) {
        for dots in other.container.values() {
            self.extend(dots.iter().cloned());
        }
    }

    /// Minimal-redraw delta from `self` (currently shown) to `other` (next).
    ///
    /// Returns the changed cells and the set of cells the consumer must blank
    /// before redrawing:
    /// - cell stacks sharing a full common prefix with `other` contribute
    ///   only the appended suffix (no blanking needed);
    /// - diverging stacks, and cells new in `other`, contribute the full new
    ///   stack and join the clear set;
    /// - cells present in `self` but gone from `other` join the clear set.
    pub fn diff(&self, other: &Buffer) -> (Buffer, BTreeSet<GridPos>) {
        let mut changed = Buffer::new();
        let mut clear_set = BTreeSet::new();

        for (pos, new_stack) in &other.container {
            match self.container.get(pos) {
                Some(old_stack) => {
                    let prefix = old_stack
                        .iter()
                        .zip(new_stack.iter())
                        .take_while(|(a, b)| a == b)
                        .count();
                    if prefix == old_stack.len() {
                        // Incremental append: emit only the suffix.
                        if prefix < new_stack.len() {
                            changed
                                .container
                                .insert(*pos, new_stack[prefix..].to_vec());
                        }
                    } else {
                        changed.container.insert(*pos, new_stack.clone());
                        clear_set.insert(*pos);
                    }
                }
                None => {
                    changed.container.insert(*pos, new_stack.clone());
                    clear_set.insert(*pos);
                }
            }
        }

        for pos in self.container.keys() {
            if !other.container.contains_key(pos) {
                clear_set.insert(*pos);
            }
        }

        (changed, clear_set)
    }

    /// Lazy sequence of all non-empty cell positions.
    pub fn mask(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.container.keys().copied()
    }

    /// Remove the given cells outright.
    pub fn cut(&mut self, mask: impl IntoIterator<Item = GridPos>) {
        for pos in mask {
            self.container.remove(&pos);
        }
    }

    /// Lazy traversal of all dots, stack order per cell, cells in map order.
    pub fn dot_seq(&self) -> impl Iterator<Item = &Dot> {
        self.container.values().flatten()
    }

    /// Cells with their stacks, in map order.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, &[Dot])> {
        self.container
            .iter()
            .map(|(pos, dots)| (*pos, dots.as_slice()))
    }

    pub(crate) fn insert_stack(&mut self, pos: GridPos, stack: Vec<Dot>) {
        if !stack.is_empty() {
            self.container.insert(pos, stack);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Rgba8;
    use crate::scene::dot::FontRef;

    fn dot(pos: (i32, i32), letter: char) -> Dot {
        Dot::new(pos, letter, Rgba8::WHITE, FontRef::new("mono", 8)).with_clear(false)
    }

    #[test]
    fn put_clear_resets_the_stack() {
        let mut buffer = Buffer::new();
        buffer.put(dot((0, 0), 'A'));
        buffer.put(dot((0, 0), 'B').with_clear(true));
        buffer.put(dot((0, 0), 'C'));

        let letters: Vec<char> = buffer.dot_seq().map(|d| d.letter).collect();
        assert_eq!(letters, vec!['B', 'C']);
    }

    #[test]
    fn put_backcolor_resets_like_clear() {
        let mut buffer = Buffer::new();
        buffer.put(dot((0, 1), 'D'));
        buffer.put(dot((0, 1), 'E').with_backcolor(Some(Rgba8::WHITE)));
        buffer.put(dot((0, 1), 'F'));

        let letters: Vec<char> = buffer.dot_seq().map(|d| d.letter).collect();
        assert_eq!(letters, vec!['E', 'F']);
    }

    #[test]
    fn erase_missing_is_a_no_op() {
        let mut buffer = Buffer::new();
        buffer.erase(&dot((5, 5), 'X'));
        buffer.erase_at(GridPos::new(5, 5), 3);
        buffer.erase_top(GridPos::new(5, 5));
        assert!(buffer.is_empty());

        buffer.put(dot((0, 0), 'A'));
        buffer.erase_at(GridPos::new(0, 0), 10);
        assert_eq!(buffer.cell_count(), 1);
    }

    #[test]
    fn erase_normalizes_empty_cells_away() {
        let mut buffer = Buffer::new();
        let d = dot((2, 2), 'A');
        buffer.put(d.clone());
        buffer.erase(&d);
        assert!(buffer.is_empty());
        assert_eq!(buffer.mask().count(), 0);
    }

    #[test]
    fn diff_emits_suffixes_and_clear_set() {
        let d0 = dot((0, 0), '0');
        let d1 = dot((0, 0), '1');
        let d4 = dot((0, 1), '4');
        let d5 = dot((0, 1), '5');
        let d6 = dot((0, 2), '6');
        let d7 = dot((0, 2), '7');

        let mut shown = Buffer::new();
        shown.insert_stack(GridPos::new(0, 0), vec![d0]);
        shown.insert_stack(GridPos::new(0, 1), vec![d4.clone()]);
        shown.insert_stack(GridPos::new(0, 2), vec![d6, d7]);

        let mut next = Buffer::new();
        next.insert_stack(GridPos::new(0, 0), vec![d1.clone()]);
        next.insert_stack(GridPos::new(0, 1), vec![d4, d5.clone()]);

        let (changed, clear_set) = shown.diff(&next);

        let mut expected = Buffer::new();
        expected.insert_stack(GridPos::new(0, 0), vec![d1]);
        expected.insert_stack(GridPos::new(0, 1), vec![d5]);
        assert_eq!(changed, expected);
        assert_eq!(
            clear_set,
            BTreeSet::from([GridPos::new(0, 0), GridPos::new(0, 2)])
        );
    }

    #[test]
    fn diff_of_identical_buffers_is_empty() {
        let mut buffer = Buffer::new();
        buffer.put(dot((1, 1), 'A'));
        buffer.put(dot((1, 1), 'B'));

        let (changed, clear_set) = buffer.diff(&buffer.clone());
        assert!(changed.is_empty());
        assert!(clear_set.is_empty());
    }

    #[test]
    fn diff_marks_cells_new_in_next_for_blanking() {
        let shown = Buffer::new();
        let mut next = Buffer::new();
        next.put(dot((3, 3), 'Z'));

        let (changed, clear_set) = shown.diff(&next);
        assert_eq!(changed.cell_count(), 1);
        assert!(clear_set.contains(&GridPos::new(3, 3)));
    }

    #[test]
    fn merge_honors_clear_semantics() {
        let mut base = Buffer::new();
        base.put(dot((0, 0), 'A'));

        let mut overlay = Buffer::new();
        overlay.put(dot((0, 0), 'B').with_clear(true));
        overlay.put(dot((1, 0), 'C'));

        base.merge(&overlay);
        let letters: Vec<char> = base.dot_seq().map(|d| d.letter).collect();
        assert_eq!(letters, vec!['B', 'C']);
    }

    #[test]
    fn cut_punches_holes() {
        let mut buffer = Buffer::new();
        buffer.put(dot((0, 0), 'A'));
        buffer.put(dot((1, 0), 'B'));
        buffer.put(dot((2, 0), 'C'));

        buffer.cut([GridPos::new(0, 0), GridPos::new(2, 0), GridPos::new(9, 9)]);
        let remaining: Vec<GridPos> = buffer.mask().collect();
        assert_eq!(remaining, vec![GridPos::new(1, 0)]);
    }

    #[test]
    fn edit_at_replaces_in_place_and_pins_the_cell() {
        let mut buffer = Buffer::new();
        buffer.put(dot((0, 0), 'A'));
        buffer.edit_at(GridPos::new(0, 0), 0, |d| d.with_letter('Z').with_pos((9, 9)));

        assert_eq!(buffer.get_at(GridPos::new(0, 0), 0).unwrap().letter, 'Z');
        assert!(buffer.get_top(GridPos::new(9, 9)).is_none());
    }
}
