//! Plotters-powered daily series widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// The ratatui `Color` import below shadows the prelude's; keep the trait methods.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::ChartKind;

/// A render-only chart description; values are index-aligned with `labels`.
pub struct WeekPlottersChart<'a> {
    pub labels: &'a [String],
    pub values: &'a [f64],
    pub kind: ChartKind,
    pub y_bounds: (f64, f64),
    pub y_label: &'a str,
}

impl<'a> Widget for WeekPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let (y0, y1) = self.y_bounds;
        if self.values.is_empty() || !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            return;
        }

        // Day `i` sits at x = i; half a day of padding on each side.
        let x0 = -0.5;
        let x1 = self.values.len() as f64 - 0.5;
        let n_labels = self.labels.len().min(8);

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let labels = self.labels;
            let x_label = |v: &f64| {
                let i = v.round();
                if (v - i).abs() > 0.01 || i < 0.0 {
                    return String::new();
                }
                labels
                    .get(i as usize)
                    .map(|l| l.get(5..).unwrap_or(l).to_string())
                    .unwrap_or_default()
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(n_labels)
                .y_labels(5)
                .x_label_formatter(&x_label)
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let color = RGBColor(0, 255, 255); // cyan

            match self.kind {
                // Filled rectangles come out blocky in a terminal; a vertical
                // stroke per day reads as a bar at this resolution.
                ChartKind::Bar => {
                    let base = 0.0_f64.clamp(y0, y1);
                    chart.draw_series(self.values.iter().enumerate().map(|(i, &v)| {
                        let x = i as f64;
                        PathElement::new(vec![(x, base), (x, v.clamp(y0, y1))], color.stroke_width(2))
                    }))?;
                }
                ChartKind::Line => {
                    chart.draw_series(LineSeries::new(
                        self.values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
                        &color,
                    ))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
