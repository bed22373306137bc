//! SVG chart files rendered with Plotters.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::ChartKind;
use crate::error::AppError;
use crate::plot::ChartData;

const SIZE: (u32, u32) = (800, 480);
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Write `chart` as an SVG file at `path`.
pub fn write_chart(path: &Path, chart: &ChartData) -> Result<(), AppError> {
    if chart.labels.len() != chart.values.len() {
        return Err(AppError::config(format!(
            "Chart '{}' has {} labels for {} values.",
            chart.title,
            chart.labels.len(),
            chart.values.len()
        )));
    }

    draw(path, chart)
        .map_err(|e| AppError::config(format!("Failed to write chart '{}': {e}", path.display())))
}

fn draw(path: &Path, chart: &ChartData) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = chart.values.len().max(1);
    let (y0, y1) = chart.y_bounds();

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d((0..n).into_segmented(), y0..y1)?;

    let labels = &chart.labels;
    let x_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_label)
        .y_desc(chart.y_label.as_str())
        .draw()?;

    match chart.kind {
        ChartKind::Bar => {
            ctx.draw_series(chart.values.iter().enumerate().map(|(i, &v)| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                    BAR_COLOR.filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            }))?;
        }
        ChartKind::Line => {
            ctx.draw_series(LineSeries::new(
                chart
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (SegmentValue::CenterOf(i), v)),
                BAR_COLOR.stroke_width(2),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_chart(kind: ChartKind) -> ChartData {
        ChartData {
            title: "Running (Week of 2017-01-15)".to_string(),
            y_label: "Miles in 30 minutes".to_string(),
            labels: vec!["2017-01-20".to_string(), "2017-01-21".to_string(), "2017-01-22".to_string()],
            values: vec![0.0, 3.41, 3.49],
            kind,
        }
    }

    #[test]
    fn writes_bar_and_line_svgs() {
        let dir = tempfile::tempdir().unwrap();
        for (name, kind) in [("bar.svg", ChartKind::Bar), ("line.svg", ChartKind::Line)] {
            let path = dir.path().join(name);
            write_chart(&path, &week_chart(kind)).unwrap();
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"), "{name} is not an SVG");
            assert!(svg.contains("Running"), "{name} is missing its title");
        }
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let mut chart = week_chart(ChartKind::Bar);
        chart.labels.pop();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.svg");
        let err = write_chart(&path, &chart).unwrap_err();
        assert!(err.message().contains("2 labels for 3 values"));
        assert!(!path.exists());
    }
}
