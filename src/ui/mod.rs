/// UI layer: top/side panels and the stacked calibration plots.
pub mod panels;
pub mod plot;
