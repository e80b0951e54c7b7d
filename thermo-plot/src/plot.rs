use anyhow::Result;
use itertools::Itertools;
use lammps_log_rust::SeriesColumn;
use plotters::prelude::*;
use std::path::Path;

const PLOT_WIDTH: u32 = 800;
const PLOT_HEIGHT: u32 = 600;

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    // pad degenerate ranges so a single-point series still renders
    if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Draw one line series per y column into a PNG at `path`.
pub fn plot_series(
    path: &Path,
    title: &str,
    x_label: &str,
    series: &[SeriesColumn],
) -> Result<()> {
    let y_label = series.iter().map(|s| s.name.as_str()).join(" / ");
    let (x_lo, x_hi) = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let (y_lo, y_hi) = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));

    let drawing_area = BitMapBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    drawing_area.fill(&WHITE)?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .margin(10)
        .caption(title, ("sans-serif", 18))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart_context
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(&y_label)
        .axis_style(BLACK)
        .label_style(("sans-serif", 14).into_font().color(&BLACK))
        .draw()?;

    for (i, column) in series.iter().enumerate() {
        let style = Palette99::pick(i).to_rgba().stroke_width(1);
        chart_context
            .draw_series(LineSeries::new(column.points.iter().copied(), style))?
            .label(&column.name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    chart_context
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    drawing_area.present()?;
    Ok(())
}
