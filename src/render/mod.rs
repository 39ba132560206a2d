//! Static figure rendering: the two stacked calibration charts written
//! to a PNG, mirroring what the interactive viewer shows.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::color::SeriesColors;
use crate::data::model::CalibrationDataset;
use crate::fit::harmonics::HarmonicMark;
use crate::fit::spline::SmoothingSpline;

// ---------------------------------------------------------------------------
// Figure constants
// ---------------------------------------------------------------------------

/// Fixed output path of the rendered figure.
pub const OUTPUT_PATH: &str = "Diode responsivity.png";

/// 10 x 8 in at 200 dpi.
pub const IMAGE_SIZE: (u32, u32) = (2000, 1600);

/// Number of evenly spaced fit samples drawn on both charts.
pub const CURVE_SAMPLES: usize = 1000;

const TITLE: &str = "Calibration for NIST aluminum oxide diode SN 448, calibrated July 17, 2019";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Render the calibration figure to `path`.
///
/// Upper chart: linear y-axis with the measured points (k=2 error bars)
/// and the fitted curve. Lower chart: the same on a log y-axis, with the
/// laser harmonics marked and annotated. Any drawing or IO failure is
/// returned as an error; there is no partial output worth keeping.
pub fn save_png<P: AsRef<Path>>(
    path: P,
    dataset: &CalibrationDataset,
    curve: &SmoothingSpline,
    marks: &[HarmonicMark],
    colors: &SeriesColors,
) -> Result<()> {
    let samples = curve.sample(CURVE_SAMPLES);

    let root = BitMapBackend::new(path.as_ref(), IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 1));
    draw_linear_chart(&areas[0], dataset, &samples, colors)?;
    draw_log_chart(&areas[1], dataset, &samples, marks, colors)?;

    root.present()
        .with_context(|| format!("writing {}", path.as_ref().display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Upper chart: linear axis
// ---------------------------------------------------------------------------

fn draw_linear_chart<DB>(
    area: &DrawingArea<DB, Shift>,
    dataset: &CalibrationDataset,
    samples: &[(f64, f64)],
    colors: &SeriesColors,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_min, x_max) = dataset.wavelength_range();
    let x_pad = (x_max - x_min) * 0.02;
    let y_top = whisker_top(dataset) * 1.05;
    // Error bars at the smallest responsivities reach below zero.
    let y_bottom = whisker_bottom(dataset).min(0.0) * 1.05;

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .caption(TITLE, ("sans-serif", 26))
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((x_min - x_pad)..(x_max + x_pad), y_bottom..y_top)?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (nm)")
        .y_desc("Responsivity (A/W)")
        .label_style(FontDesc::new(
            FontFamily::SansSerif,
            18.0,
            FontStyle::Normal,
        ))
        .draw()?;

    let measured = colors.measured.plotters();
    chart
        .draw_series(dataset.iter().map(|m| {
            ErrorBar::new_vertical(
                m.wavelength_nm,
                m.responsivity_a_per_w - m.uncertainty_a_per_w,
                m.responsivity_a_per_w,
                m.responsivity_a_per_w + m.uncertainty_a_per_w,
                measured.filled(),
                6,
            )
        }))?
        .label("NIST measured data")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, measured.filled()));

    let fit = colors.fit.plotters();
    chart
        .draw_series(LineSeries::new(samples.iter().copied(), &fit))?
        .label("Spline fit")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fit));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(FontDesc::new(
            FontFamily::SansSerif,
            16.0,
            FontStyle::Normal,
        ))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Lower chart: log axis with harmonic annotations
// ---------------------------------------------------------------------------

fn draw_log_chart<DB>(
    area: &DrawingArea<DB, Shift>,
    dataset: &CalibrationDataset,
    samples: &[(f64, f64)],
    marks: &[HarmonicMark],
    colors: &SeriesColors,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_min, x_max) = dataset.wavelength_range();
    let x_pad = (x_max - x_min) * 0.02;
    // Headroom above the tallest whisker leaves room for annotations.
    let y_top = whisker_top(dataset) * 1.5;
    let floor = log_floor(dataset);

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((x_min - x_pad)..(x_max + x_pad), (floor..y_top).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (nm)")
        .y_desc("Responsivity (A/W)")
        .label_style(FontDesc::new(
            FontFamily::SansSerif,
            18.0,
            FontStyle::Normal,
        ))
        .draw()?;

    // Whiskers that reach zero or below are clamped to the axis floor;
    // a log axis has nowhere else to put them.
    let measured = colors.measured.plotters();
    chart.draw_series(dataset.iter().map(|m| {
        ErrorBar::new_vertical(
            m.wavelength_nm,
            (m.responsivity_a_per_w - m.uncertainty_a_per_w).max(floor),
            m.responsivity_a_per_w.max(floor),
            (m.responsivity_a_per_w + m.uncertainty_a_per_w).max(floor),
            measured.filled(),
            6,
        )
    }))?;

    let fit = colors.fit.plotters();
    let positive: Vec<(f64, f64)> = samples
        .iter()
        .copied()
        .filter(|&(_, y)| y > 0.0)
        .map(|(x, y)| (x, y.max(floor)))
        .collect();
    chart.draw_series(LineSeries::new(positive, &fit))?;

    let harmonic = colors.harmonic.plotters();
    for mark in marks {
        let y = mark.responsivity_a_per_w.max(floor);
        chart.draw_series(std::iter::once(Circle::new(
            (mark.wavelength_nm, y),
            5,
            harmonic.filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            mark.label(),
            (mark.wavelength_nm + 2.0, y * 1.35),
            FontDesc::new(FontFamily::SansSerif, 15.0, FontStyle::Normal).color(&harmonic),
        )))?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

fn whisker_top(dataset: &CalibrationDataset) -> f64 {
    dataset
        .iter()
        .map(|m| m.responsivity_a_per_w + m.uncertainty_a_per_w)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn whisker_bottom(dataset: &CalibrationDataset) -> f64 {
    dataset
        .iter()
        .map(|m| m.responsivity_a_per_w - m.uncertainty_a_per_w)
        .fold(f64::INFINITY, f64::min)
}

/// Lowest drawable value on the log axis, a little under the smallest
/// positive responsivity. Shared with the interactive viewer so both
/// log plots clamp whiskers identically.
pub(crate) fn log_floor(dataset: &CalibrationDataset) -> f64 {
    dataset
        .responsivities_a_per_w()
        .iter()
        .copied()
        .filter(|&r| r > 0.0)
        .fold(f64::INFINITY, f64::min)
        * 0.3
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SeriesColors;
    use crate::data::loader::nist_dataset;
    use crate::fit::harmonics::harmonic_marks;
    use crate::fit::spline::SmoothingSpline;

    #[test]
    fn renders_nonempty_png() {
        let dataset = nist_dataset().unwrap();
        let curve =
            SmoothingSpline::fit(dataset.wavelengths_nm(), dataset.responsivities_a_per_w())
                .unwrap();
        let marks = harmonic_marks(&curve);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_PATH);
        save_png(&path, &dataset, &curve, &marks, &SeriesColors::default()).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }
}
