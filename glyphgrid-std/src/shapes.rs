//! Dot-sequence generators for geometric shapes on the logical grid.
//!
//! Every function returns the grid cells the shape covers, in drawing
//! order. Cells may repeat where strokes overlap; `Buffer::put` handles
//! that naturally.

use glyphgrid::GridPos;

const EPS: f64 = 1e-16;

/// Rasterize the segment from `p1` to `p2` with the DDA algorithm.
///
/// `include_end` controls whether the final point is emitted; chained
/// segments pass `false` to avoid doubling shared vertices.
pub fn line_seq(p1: (f64, f64), p2: (f64, f64), include_end: bool) -> Vec<GridPos> {
    let dx = p2.0 - p1.0;
    let dy = p2.1 - p1.1;
    let step = dx.abs().max(dy.abs());
    if step <= EPS {
        return vec![GridPos {
            x: p1.0.round() as i32,
            y: p1.1.round() as i32,
        }];
    }
    let sx = dx / step;
    let sy = dy / step;
    let count = step.round() as i64 + i64::from(include_end);
    (0..count)
        .map(|i| GridPos {
            x: (p1.0 + i as f64 * sx).round() as i32,
            y: (p1.1 + i as f64 * sy).round() as i32,
        })
        .collect()
}

/// Every cell of a `cols x rows` rectangle, row-major from `origin`.
pub fn grid_seq(cols: u32, rows: u32, origin: impl Into<GridPos>) -> Vec<GridPos> {
    let origin = origin.into();
    let mut out = Vec::with_capacity((cols as usize) * (rows as usize));
    for y in origin.y..origin.y + rows as i32 {
        for x in origin.x..origin.x + cols as i32 {
            out.push(GridPos { x, y });
        }
    }
    out
}

fn chord_ends(cx: i32, half_chord: f64) -> (i32, i32) {
    (
        (cx as f64 - half_chord).round() as i32,
        (cx as f64 + half_chord).round() as i32,
    )
}

/// A filled disc: horizontal chords above and below the center row, small
/// caps at the poles, and the full-diameter middle row.
pub fn circle_seq(center: impl Into<GridPos>, radius: u32) -> Vec<GridPos> {
    let center = center.into();
    let radius = radius as i32;
    let r_sq = (radius * radius) as f64;
    let mut out = Vec::new();
    let mut caps_r = 0;
    for d in 1..radius {
        let half_chord = (r_sq - (d * d) as f64).sqrt();
        let (x_left, x_right) = chord_ends(center.x, half_chord);
        for y in [center.y - d, center.y + d] {
            out.extend(line_seq(
                (x_left as f64, y as f64),
                (x_right as f64, y as f64),
                true,
            ));
        }
        if x_right - x_left == 2 * radius {
            caps_r += 1;
        }
    }

    let (x_left, x_right) = chord_ends(center.x, caps_r as f64);
    for y in [center.y - radius, center.y + radius] {
        out.extend(line_seq(
            (x_left as f64, y as f64),
            (x_right as f64, y as f64),
            true,
        ));
    }

    let (x_left, x_right) = chord_ends(center.x, radius as f64);
    out.extend(line_seq(
        (x_left as f64, center.y as f64),
        (x_right as f64, center.y as f64),
        true,
    ));
    out
}

/// The outline of a regular `n`-gon inscribed in a circle of `radius`
/// cells, first vertex at angle `offset` radians from straight up.
pub fn polygon_seq(n: u32, center: impl Into<GridPos>, radius: u32, offset: f64) -> Vec<GridPos> {
    let center = center.into();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![center];
    }
    let da = std::f64::consts::TAU / n as f64;
    let vertex = |angle: f64| {
        (
            (angle.sin() * radius as f64).trunc() + center.x as f64,
            (angle.cos() * radius as f64).trunc() + center.y as f64,
        )
    };
    let first = vertex(offset);
    let mut prev = first;
    let mut out = Vec::new();
    for v in 1..n {
        let pos = vertex(offset + v as f64 * da);
        out.extend(line_seq(prev, pos, false));
        prev = pos;
    }
    out.extend(line_seq(prev, first, true));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> GridPos {
        GridPos { x, y }
    }

    #[test]
    fn line_seq_walks_the_dominant_axis() {
        let cells = line_seq((0.0, 0.0), (4.0, 2.0), true);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells.first(), Some(&pos(0, 0)));
        assert_eq!(cells.last(), Some(&pos(4, 2)));
        // One cell per x step: the dominant axis never skips.
        let xs: Vec<i32> = cells.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn line_seq_degenerate_segment_is_a_single_cell() {
        assert_eq!(line_seq((3.0, 7.0), (3.0, 7.0), true), vec![pos(3, 7)]);
    }

    #[test]
    fn line_seq_excluding_end_drops_exactly_the_endpoint() {
        let open = line_seq((0.0, 0.0), (3.0, 0.0), false);
        let closed = line_seq((0.0, 0.0), (3.0, 0.0), true);
        assert_eq!(open.len() + 1, closed.len());
        assert!(!open.contains(&pos(3, 0)));
    }

    #[test]
    fn grid_seq_is_row_major_from_origin() {
        let cells = grid_seq(3, 2, (10, 20));
        assert_eq!(
            cells,
            vec![
                pos(10, 20),
                pos(11, 20),
                pos(12, 20),
                pos(10, 21),
                pos(11, 21),
                pos(12, 21),
            ]
        );
    }

    #[test]
    fn circle_seq_is_symmetric_and_covers_the_middle_row() {
        let cells = circle_seq((0, 0), 3);
        for x in -3..=3 {
            assert!(cells.contains(&pos(x, 0)), "middle row missing x={x}");
        }
        for p in &cells {
            assert!(cells.contains(&pos(-p.x, p.y)), "no mirror for {p:?}");
            assert!(cells.contains(&pos(p.x, -p.y)), "no mirror for {p:?}");
        }
    }

    #[test]
    fn polygon_seq_small_orders() {
        assert!(polygon_seq(0, (0, 0), 5, 0.0).is_empty());
        assert_eq!(polygon_seq(1, (2, 2), 5, 0.0), vec![pos(2, 2)]);
    }

    #[test]
    fn polygon_seq_square_touches_all_four_vertices() {
        // offset pi/4 puts vertices on the diagonals.
        let cells = polygon_seq(4, (0, 0), 4, std::f64::consts::FRAC_PI_4);
        let hits = |x: i32, y: i32| cells.contains(&pos(x, y));
        assert!(hits(2, 2) && hits(2, -2) && hits(-2, -2) && hits(-2, 2));
    }
}
