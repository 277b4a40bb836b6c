//! Text layout helpers: placing strings on the grid and producing
//! per-tick string views for scrolling and typewriter effects.

use glyphgrid::GridPos;

/// Lay `text` out left to right on a single row starting at `pos`.
pub fn words_line(text: &str, pos: impl Into<GridPos>) -> Vec<(GridPos, char)> {
    let pos = pos.into();
    text.chars()
        .enumerate()
        .map(|(i, letter)| (pos.offset(i as i32, 0), letter))
        .collect()
}

/// Lay `text` out inside a `cols x rows` region at `origin`, hard-wrapping
/// at the region's right edge. Text past the last row is discarded.
pub fn words_bound(text: &str, origin: impl Into<GridPos>, cols: u32, rows: u32) -> Vec<(GridPos, char)> {
    let origin = origin.into();
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut rest = chars.as_slice();
    let (mut col, mut row) = (0u32, 0u32);
    while !rest.is_empty() && row < rows {
        let cut = ((cols - col) as usize).min(rest.len());
        let (word, tail) = rest.split_at(cut);
        rest = tail;
        for (i, &letter) in word.iter().enumerate() {
            out.push((origin.offset((col as usize + i) as i32, row as i32), letter));
        }
        if col as usize + word.len() >= cols as usize {
            col = 0;
            row += 1;
        } else {
            col += word.len() as u32;
        }
    }
    out
}

/// Sliding `window`-wide views over `text`, starting from an all-blank
/// view so the text scrolls in from the right. Pass `start > 0` to begin
/// from a partially filled view.
pub fn scroll(text: &str, window: usize, start: usize) -> Vec<String> {
    let padded: Vec<char> = std::iter::repeat_n(' ', window).chain(text.chars()).collect();
    let views = padded.len() - window + 1;
    (start..views)
        .map(|pos| padded[pos..pos + window].iter().collect())
        .collect()
}

/// Growing prefixes of `text`, one character per view. The first view is
/// the `start`-character prefix, the last is the whole string.
pub fn reveal(text: &str, start: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    (start..=chars.len())
        .map(|pos| chars[..pos].iter().collect())
        .collect()
}
