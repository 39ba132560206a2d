/// Curve fitting: the smoothing spline over the calibration points and
/// the harmonic evaluations derived from it.
///
/// ```text
///   CalibrationDataset (wavelength, responsivity)
///        │
///        ▼
///   ┌────────────────┐
///   │ SmoothingSpline │  natural cubic fit, residual budget s = n·5e-12
///   └────────────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ harmonic_marks │  evaluate at 1035/h nm, h = 5..10
///   └───────────────┘
/// ```
pub mod harmonics;
pub mod spline;
