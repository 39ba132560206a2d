use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// One plot-series colour, usable by both renderers.
#[derive(Debug, Clone, Copy)]
pub struct SeriesColor {
    rgb: (u8, u8, u8),
}

impl SeriesColor {
    /// Build a colour from hue/saturation/lightness.
    fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hsl = Hsl::new(hue, saturation, lightness);
        let rgb: Srgb = hsl.into_color();
        SeriesColor {
            rgb: (
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ),
        }
    }

    /// The colour for egui widgets and plots.
    pub fn egui(&self) -> Color32 {
        Color32::from_rgb(self.rgb.0, self.rgb.1, self.rgb.2)
    }

    /// The colour for plotters chart elements.
    pub fn plotters(&self) -> RGBColor {
        RGBColor(self.rgb.0, self.rgb.1, self.rgb.2)
    }
}

/// Colours for the three plotted series, shared by the PNG renderer and
/// the interactive viewer so both read identically.
#[derive(Debug, Clone, Copy)]
pub struct SeriesColors {
    /// Measured points and their error bars.
    pub measured: SeriesColor,
    /// The fitted spline curve.
    pub fit: SeriesColor,
    /// Harmonic markers and their annotations.
    pub harmonic: SeriesColor,
}

impl Default for SeriesColors {
    fn default() -> Self {
        SeriesColors {
            measured: SeriesColor::from_hsl(207.0, 0.66, 0.50),
            fit: SeriesColor::from_hsl(28.0, 0.90, 0.52),
            harmonic: SeriesColor::from_hsl(0.0, 0.80, 0.45),
        }
    }
}
