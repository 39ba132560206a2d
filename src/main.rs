mod app;
mod color;
mod data;
mod fit;
mod render;
mod state;
mod ui;

use anyhow::Result;
use eframe::egui;

use app::CalibrationApp;
use color::SeriesColors;
use fit::spline::SmoothingSpline;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let dataset = data::loader::nist_dataset()?;
    let (lo, hi) = dataset.wavelength_range();
    log::info!(
        "loaded {} calibration points spanning {lo:.1}-{hi:.1} nm",
        dataset.len()
    );

    let curve = SmoothingSpline::fit(dataset.wavelengths_nm(), dataset.responsivities_a_per_w())?;
    log::info!(
        "spline fit done: residual {:.3e} within budget {:.3e}",
        curve.residual(),
        curve.budget()
    );

    let harmonics = fit::harmonics::harmonic_marks(&curve);
    let colors = SeriesColors::default();

    render::save_png(render::OUTPUT_PATH, &dataset, &curve, &harmonics, &colors)?;
    log::info!("wrote {}", render::OUTPUT_PATH);

    let mut state = AppState::new(dataset, &curve, harmonics, colors);
    state.status_message = Some(format!("saved {}", render::OUTPUT_PATH));

    // The figure is already on disk; a headless environment only loses
    // the interactive window.
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 850.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };
    if let Err(err) = eframe::run_native(
        "Diode Responsivity – Calibration Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(CalibrationApp::new(state)))),
    ) {
        log::warn!("viewer window unavailable: {err}");
    }

    Ok(())
}
