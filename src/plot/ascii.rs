//! ASCII bar plots for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bars: `#`, drawn from the zero line to the value
//! - zero values: `_` on the zero line

/// Width of one date column, including the gap.
const COL: usize = 6;

/// Render one bar per value, labelled by the `MM-DD` tail of each label.
pub fn render_ascii_bars(title: &str, labels: &[String], values: &[f64], height: usize) -> String {
    let height = height.max(3);
    let (y_min, y_max) = bar_range(values);
    let zero = map_y(0.0, y_min, y_max, height);

    let mut grid = vec![vec![' '; values.len() * COL]; height];

    for (i, &v) in values.iter().enumerate() {
        let x0 = i * COL;
        if v == 0.0 {
            for c in 0..COL - 1 {
                grid[zero][x0 + c] = '_';
            }
            continue;
        }
        let row = map_y(v, y_min, y_max, height);
        let (top, bottom) = if row <= zero { (row, zero) } else { (zero, row) };
        for line in grid.iter_mut().take(bottom + 1).skip(top) {
            for c in 0..COL - 1 {
                line[x0 + c] = '#';
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{title} | y=[{y_min:.2}, {y_max:.2}]\n"));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let axis: Vec<String> = labels.iter().map(|l| format!("{:<5}", short_label(l))).collect();
    out.push_str(axis.join(" ").trim_end());
    out.push('\n');

    out
}

fn short_label(label: &str) -> &str {
    // `YYYY-MM-DD` -> `MM-DD`; anything else is shown as-is (truncated).
    if label.len() == 10 && label.is_char_boundary(5) {
        &label[5..]
    } else {
        truncate(label, 5)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn bar_range(values: &[f64]) -> (f64, f64) {
    let mut min_y = 0.0_f64;
    let mut max_y = 0.0_f64;
    for &v in values {
        if v.is_finite() {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }
    if max_y > min_y { (min_y, max_y) } else { (min_y, min_y + 1.0) }
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}
