use crate::Result;
use crate::annotation::{Annotation, BLOCK_WIDTH, stack_blocks};
use crate::render::{
    CANVAS_SIZE, Y_DIVISIONS, axis_range, draw_blocks, draw_guides, write_pdf,
};
use crate::spikes::Histogram;
use plotters::coord::combinators::BindKeyPoints;
use plotters::prelude::*;
use std::path::PathBuf;

/// Default output of the spike histogram.
pub const SPIKE_CHART_FILE: &str = "spikes.pdf";

const BAR_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

#[derive(Debug, Clone)]
pub struct SpikeChartOptions {
    /// Simulation length in ms; fixes the x axis.
    pub sim_time: f64,
    pub out: PathBuf,
}

/// Draw the spike count histogram with the modulator overlay.
///
/// The y axis runs from 0 to the tallest bin. Overlay blocks are one
/// sixteenth of that per level and start at the lowest bin count.
pub fn render_spike_chart(
    hist: &Histogram,
    annotation: &Annotation,
    opts: &SpikeChartOptions,
) -> Result<()> {
    let svg = spike_chart_svg(hist, annotation, opts)?;
    write_pdf(&svg, &opts.out)?;
    log::info!(
        "rendered spike histogram with {} bins (max {} spikes per bin)",
        hist.counts.len(),
        hist.max_count()
    );
    Ok(())
}

fn spike_chart_svg(
    hist: &Histogram,
    annotation: &Annotation,
    opts: &SpikeChartOptions,
) -> Result<String> {
    let max_count = hist.max_count() as f64;
    let min_count = hist.min_count() as f64;
    let x = (0.0, opts.sim_time);
    let y = axis_range(0.0, max_count);
    let unit = (y.1 - y.0) / f64::from(Y_DIVISIONS);
    let ticks: Vec<f64> = (0..=Y_DIVISIONS)
        .map(|i| min_count + unit * f64::from(i))
        .filter(|&t| t <= y.1)
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CANVAS_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x.0..x.1, (y.0..y.1).with_key_points(ticks.clone()))?;
        chart
            .configure_mesh()
            .disable_mesh()
            .y_labels(ticks.len())
            .x_desc("Simulation time (ms)")
            .y_desc("Spikes (count)")
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| format!("{:.1}", v))
            .draw()?;

        draw_guides(&mut chart, x, &ticks, y)?;
        chart.draw_series(hist.bins().filter(|&(_, _, count)| count > 0).map(
            |(left, right, count)| {
                Rectangle::new([(left, 0.0), (right, count as f64)], BAR_COLOR.filled())
            },
        ))?;

        let blocks = stack_blocks(annotation, min_count, unit, BLOCK_WIDTH);
        draw_blocks(&mut chart, &blocks, x, y)?;

        root.present()?;
    }
    Ok(svg)
}
