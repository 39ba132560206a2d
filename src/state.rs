use crate::color::SeriesColors;
use crate::data::model::CalibrationDataset;
use crate::fit::harmonics::HarmonicMark;
use crate::fit::spline::SmoothingSpline;
use crate::render;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The viewer state, built once in `main` and handed to the app.
///
/// Dataset, fit samples, and harmonic marks are all derived before the
/// window opens; the UI reads them and only mutates the view toggles.
pub struct AppState {
    /// The parsed calibration table.
    pub dataset: CalibrationDataset,

    /// Fitted curve sampled on the dense grid both plots share.
    pub curve_samples: Vec<(f64, f64)>,

    /// Harmonic evaluations marked on the log plot.
    pub harmonics: Vec<HarmonicMark>,

    /// Series colours shared with the PNG renderer.
    pub colors: SeriesColors,

    /// Series visibility toggles.
    pub show_measured: bool,
    pub show_fit: bool,
    pub show_harmonics: bool,

    /// Status line shown in the top bar (e.g. where the PNG went).
    pub status_message: Option<String>,
}

impl AppState {
    /// Assemble the viewer state from the already-fitted pieces.
    pub fn new(
        dataset: CalibrationDataset,
        curve: &SmoothingSpline,
        harmonics: Vec<HarmonicMark>,
        colors: SeriesColors,
    ) -> Self {
        AppState {
            curve_samples: curve.sample(render::CURVE_SAMPLES),
            dataset,
            harmonics,
            colors,
            show_measured: true,
            show_fit: true,
            show_harmonics: true,
            status_message: None,
        }
    }
}
