//! Chart rendering.
//!
//! - SVG files via Plotters (`svg`)
//! - deterministic terminal bars (`ascii`)
//!
//! Both consume a `ChartData`, which is built from a dataset once and holds
//! labels and values of equal length.

use crate::domain::{ChartKind, ChartSeries};
use crate::merge::{Dataset, chart_values, date_labels};

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_bars;
pub use svg::write_chart;

/// A render-ready series: title, axis label, and aligned labels/values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub kind: ChartKind,
}

impl ChartData {
    pub fn from_dataset(dataset: &Dataset, series: ChartSeries, default: f64) -> Self {
        Self {
            title: series.chart_title(dataset.range()),
            y_label: series.y_label().to_string(),
            labels: date_labels(dataset.range()),
            values: chart_values(dataset, series, default),
            kind: series.kind(),
        }
    }

    /// Y bounds for drawing.
    ///
    /// Bars always include zero; lines are padded around the observed span.
    pub fn y_bounds(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
        }
        if !(min.is_finite() && max.is_finite()) {
            return (0.0, 1.0);
        }

        match self.kind {
            ChartKind::Bar => {
                let (lo, hi) = (min.min(0.0), max.max(0.0));
                if hi > lo { (lo, hi + (hi - lo) * 0.05) } else { (lo, lo + 1.0) }
            }
            ChartKind::Line => {
                let span = (max - min).abs();
                let pad = if span > 0.0 { span * 0.1 } else { 1.0 };
                (min - pad, max + pad)
            }
        }
    }
}
