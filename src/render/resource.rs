use crate::Result;
use crate::annotation::{Annotation, BLOCK_WIDTH, stack_blocks};
use crate::model::{CpuSeries, ResourceData};
use crate::render::{
    CANVAS_SIZE, axis_range, division_unit, draw_blocks, draw_guides, write_pdf, y_ticks,
};
use anyhow::bail;
use plotters::coord::combinators::BindKeyPoints;
use plotters::coord::{CoordTranslate, Shift};
use plotters::prelude::*;
use std::path::PathBuf;

/// Default output of the resource chart.
pub const RESOURCE_CHART_FILE: &str = "CPU.pdf";

#[derive(Debug, Clone)]
pub struct ResourceChartOptions {
    /// Simulation length in ms; the x axis covers at least this much.
    pub sim_time: f64,
    /// Add a memory panel below the CPU panel.
    pub with_ram: bool,
    pub out: PathBuf,
}

/// Draw CPU time (mean or per core) with the modulator overlay, and
/// optionally memory usage on a second panel sharing the x axis.
pub fn render_resource_chart(
    data: &ResourceData,
    annotation: &Annotation,
    opts: &ResourceChartOptions,
) -> Result<()> {
    let svg = resource_chart_svg(data, annotation, opts)?;
    write_pdf(&svg, &opts.out)?;
    log::info!("rendered resource chart with {} samples", data.time.len());
    Ok(())
}

fn resource_chart_svg(
    data: &ResourceData,
    annotation: &Annotation,
    opts: &ResourceChartOptions,
) -> Result<String> {
    let Some((cpu_min, cpu_max)) = data.cpu.bounds() else {
        bail!("no CPU values to plot");
    };
    let last_step = data.time.last().copied().unwrap_or(0) as f64;
    let x = (0.0, opts.sim_time.max(last_step + 1.0));
    let y = axis_range(cpu_min, cpu_max);
    let ticks = y_ticks(cpu_min, cpu_max);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CANVAS_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let (cpu_area, mem_area) = if opts.with_ram {
            let (upper, lower) = root.split_vertically(CANVAS_SIZE.1 / 2);
            (upper, Some(lower))
        } else {
            (root.clone(), None)
        };

        let mut cpu_chart = ChartBuilder::on(&cpu_area)
            .margin(10)
            .x_label_area_size(if opts.with_ram { 0 } else { 40 })
            .y_label_area_size(70)
            .build_cartesian_2d(x.0..x.1, (y.0..y.1).with_key_points(ticks.clone()))?;
        // With a memory panel the time axis is labelled there instead.
        cpu_chart
            .configure_mesh()
            .disable_mesh()
            .y_labels(ticks.len())
            .y_desc("CPU time (s)")
            .y_label_formatter(&|v| format!("{:.2}", v))
            .x_desc(if opts.with_ram { "" } else { "Simulation time (ms)" })
            .x_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        draw_guides(&mut cpu_chart, x, &ticks, y)?;
        draw_cpu(&mut cpu_chart, data)?;

        let blocks = stack_blocks(annotation, y.0, division_unit(cpu_min, cpu_max), BLOCK_WIDTH);
        draw_blocks(&mut cpu_chart, &blocks, x, y)?;

        if let Some(mem_area) = mem_area {
            draw_memory(&mem_area, data, x)?;
        }

        root.present()?;
    }
    Ok(svg)
}

fn draw_cpu<DB, CT>(chart: &mut ChartContext<'_, DB, CT>, data: &ResourceData) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let time = data.time.iter().map(|&t| t as f64);
    match &data.cpu {
        CpuSeries::Mean(values) => {
            chart.draw_series(LineSeries::new(
                time.zip(values.iter().copied()),
                RED.stroke_width(1),
            ))?;
        }
        CpuSeries::PerCore(cores) => {
            for (index, values) in cores.iter().enumerate() {
                chart.draw_series(LineSeries::new(
                    time.clone().zip(values.iter().copied()),
                    Palette99::pick(index).stroke_width(1),
                ))?;
            }
        }
    }
    Ok(())
}

fn draw_memory<DB>(area: &DrawingArea<DB, Shift>, data: &ResourceData, x: (f64, f64)) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (lo, hi) = data
        .memory
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &m| (lo.min(m), hi.max(m)));
    let y = if lo.is_finite() { axis_range(lo, hi) } else { (0.0, 1.0) };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x.0..x.1, y.0..y.1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Simulation time (ms)")
        .y_desc("RAM (MB)")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    draw_guides(&mut chart, x, &[], y)?;
    chart.draw_series(LineSeries::new(
        data.time
            .iter()
            .map(|&t| t as f64)
            .zip(data.memory.iter().copied()),
        BLUE.stroke_width(1),
    ))?;
    Ok(())
}
