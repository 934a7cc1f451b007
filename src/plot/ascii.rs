//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - monthly ex-ante values: `o`
//! - connecting line: `-`
//! - neutral-rate reference lines: `.` (labelled on the right)

use crate::domain::{NEUTRAL_RATE_BANDS, RateFrame};

/// Render the ex-ante series of `frame` with the neutral-rate bands.
pub fn render_ascii_plot(frame: &RateFrame, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<(f64, f64)> = frame
        .rows
        .iter()
        .map(|r| (r.month.ordinal() as f64, r.ex_ante))
        .collect();

    let (Some(first), Some(last)) = (frame.rows.first(), frame.rows.last()) else {
        return "Plot: (no data)\n".to_string();
    };

    let t_min = first.month.ordinal() as f64;
    let mut t_max = last.month.ordinal() as f64;
    if t_max <= t_min {
        t_max = t_min + 1.0;
    }

    let (y_min, y_max) = y_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let mut labels: Vec<Vec<String>> = vec![Vec::new(); height];

    // Reference lines first so the series overlays them.
    for band in NEUTRAL_RATE_BANDS {
        let row = map_y(band, y_min, y_max, height);
        for cell in grid[row].iter_mut() {
            *cell = '.';
        }
        labels[row].push(format!("{band:.1}"));
    }

    let mut prev = None;
    for &(t, y) in &points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, x, yy, '-');
        }
        prev = Some((x, yy));
    }

    for &(t, y) in &points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{}, {}] | ex-ante=[{y_min:.2}, {y_max:.2}]%\n",
        first.month, last.month,
    ));

    for (row, row_labels) in grid.into_iter().zip(labels) {
        out.push_str(&row.into_iter().collect::<String>());
        if !row_labels.is_empty() {
            out.push(' ');
            out.push_str(&row_labels.join("/"));
        }
        out.push('\n');
    }

    out
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    for band in NEUTRAL_RATE_BANDS {
        min_y = min_y.min(band);
        max_y = max_y.max(band);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Overwrites blanks and reference dots.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
