//! Chart rendering: plotters draws SVG in memory, svg2pdf writes the PDF.
//!
//! Both charts share the same frame: x guides every 250 ms up to the
//! simulation time, 16 equal y divisions of the data range, and stacked
//! modulator blocks drawn on top.

pub mod resource;
pub mod spikes;

pub use resource::{RESOURCE_CHART_FILE, ResourceChartOptions, render_resource_chart};
pub use spikes::{SPIKE_CHART_FILE, SpikeChartOptions, render_spike_chart};

use crate::Result;
use crate::annotation::Block;
use anyhow::{Context, anyhow};
use plotters::coord::CoordTranslate;
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use svg2pdf::usvg;

/// Distance between x guides, in simulation ms.
pub const X_TICK_STEP: f64 = 250.0;

/// Number of equal divisions of the y range.
pub const Y_DIVISIONS: u32 = 16;

/// Canvas size in pixels (16:9).
pub const CANVAS_SIZE: (u32, u32) = (1600, 900);

const BLOCK_OPACITY: f64 = 0.95;
const GUIDE_OPACITY: f64 = 0.2;

/// Vertical guides beyond this many are not drawn.
const MAX_X_GUIDES: u32 = 10_000;

/// Widen an empty range so it can be divided.
pub fn axis_range(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min, min + 1.0) }
}

/// Height of one y division.
pub fn division_unit(min: f64, max: f64) -> f64 {
    let (lo, hi) = axis_range(min, max);
    (hi - lo) / f64::from(Y_DIVISIONS)
}

/// The `Y_DIVISIONS + 1` evenly spaced y values from `min` to `max`.
pub fn y_ticks(min: f64, max: f64) -> Vec<f64> {
    let (lo, _) = axis_range(min, max);
    let unit = division_unit(min, max);
    (0..=Y_DIVISIONS).map(|i| lo + unit * f64::from(i)).collect()
}

/// x values of the vertical guides in `[0, x_max]`.
pub fn x_ticks(x_max: f64) -> Vec<f64> {
    let count = ((x_max / X_TICK_STEP).floor().max(0.0) as u32).min(MAX_X_GUIDES);
    (0..=count).map(|i| f64::from(i) * X_TICK_STEP).collect()
}

/// Clamp a block to the plotting window; `None` if nothing is left.
pub fn clip_block(block: &Block, x: (f64, f64), y: (f64, f64)) -> Option<[(f64, f64); 2]> {
    let x0 = block.x0.max(x.0);
    let x1 = block.x1.min(x.1);
    let y0 = block.y0.max(y.0);
    let y1 = block.y1.min(y.1);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some([(x0, y0), (x1, y1)])
}

/// Convert a rendered SVG chart to PDF and write it to `out`.
pub fn write_pdf(svg: &str, out: &Path) -> Result<()> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| anyhow!("parse rendered chart: {}", e))?;
    let pdf = svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| anyhow!("convert chart to PDF: {:?}", e))?;
    fs::write(out, pdf).with_context(|| format!("write chart {}", out.display()))
}

pub(crate) fn draw_guides<DB, CT>(
    chart: &mut ChartContext<'_, DB, CT>,
    x: (f64, f64),
    y_values: &[f64],
    y: (f64, f64),
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let style = BLACK.mix(GUIDE_OPACITY);
    for tx in x_ticks(x.1) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(tx, y.0), (tx, y.1)],
            style,
        )))?;
    }
    for &ty in y_values {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x.0, ty), (x.1, ty)],
            style,
        )))?;
    }
    Ok(())
}

pub(crate) fn draw_blocks<DB, CT>(
    chart: &mut ChartContext<'_, DB, CT>,
    blocks: &[Block],
    x: (f64, f64),
    y: (f64, f64),
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    CT: CoordTranslate<From = (f64, f64)>,
{
    chart.draw_series(blocks.iter().filter_map(|block| {
        let corners = clip_block(block, x, y)?;
        let (r, g, b) = block.modulator.rgb();
        Some(Rectangle::new(
            corners,
            RGBColor(r, g, b).mix(BLOCK_OPACITY).filled(),
        ))
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Modulator;
    use pretty_assertions::assert_eq;

    /// Whether `svg` has a text element reading exactly `label`.
    pub(crate) fn has_label(svg: &str, label: &str) -> bool {
        svg.contains(&format!(">\n{}\n</text>", label))
    }

    #[test]
    fn sixteen_divisions() {
        let ticks = y_ticks(2.0, 18.0);
        assert_eq!(ticks.len(), 17);
        assert_eq!(ticks[0], 2.0);
        assert_eq!(ticks[1], 3.0);
        assert_eq!(ticks[16], 18.0);
        assert_eq!(division_unit(2.0, 18.0), 1.0);
    }

    #[test]
    fn flat_range_is_widened() {
        assert_eq!(axis_range(5.0, 5.0), (5.0, 6.0));
        assert_eq!(division_unit(5.0, 5.0), 1.0 / 16.0);
    }

    #[test]
    fn x_guides_every_250() {
        assert_eq!(x_ticks(1000.0), vec![0.0, 250.0, 500.0, 750.0, 1000.0]);
        assert_eq!(x_ticks(600.0), vec![0.0, 250.0, 500.0]);
        assert_eq!(x_ticks(f64::MAX).len(), MAX_X_GUIDES as usize + 1);
    }

    #[test]
    fn writes_pdf_from_svg() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chart.pdf");
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect x="0" y="0" width="10" height="10" fill="red"/></svg>"#;

        write_pdf(svg, &out).unwrap();

        assert!(fs::read(&out).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn invalid_svg_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_pdf("not svg", &dir.path().join("chart.pdf")).is_err());
    }

    #[test]
    fn blocks_are_clipped_to_window() {
        let block = Block {
            x0: 900.0,
            y0: 4.0,
            x1: 1150.0,
            y1: 12.0,
            modulator: Modulator::Dopamine,
        };
        assert_eq!(
            clip_block(&block, (0.0, 1000.0), (0.0, 10.0)),
            Some([(900.0, 4.0), (1000.0, 10.0)])
        );
        assert_eq!(clip_block(&block, (0.0, 500.0), (0.0, 10.0)), None);
        assert_eq!(clip_block(&block, (0.0, 1000.0), (0.0, 3.0)), None);
    }
}
