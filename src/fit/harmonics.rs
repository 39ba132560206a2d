use crate::fit::spline::SmoothingSpline;

// ---------------------------------------------------------------------------
// Laser harmonics
// ---------------------------------------------------------------------------

/// Fundamental wavelength of the drive laser (nm).
pub const FUNDAMENTAL_NM: f64 = 1035.0;

/// Harmonic orders marked on the log plot.
pub const ORDERS: std::ops::RangeInclusive<u32> = 5..=10;

/// One harmonic of the fundamental, evaluated on the fitted curve.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicMark {
    pub order: u32,
    pub wavelength_nm: f64,
    pub responsivity_a_per_w: f64,
    /// Whether the harmonic fell outside the measured range.
    pub extrapolated: bool,
}

impl HarmonicMark {
    /// Annotation text, e.g. `H7, 147.9 nm: 5.43e-5 A/W`.
    pub fn label(&self) -> String {
        format!(
            "H{}, {:.1} nm: {:.2e} A/W",
            self.order, self.wavelength_nm, self.responsivity_a_per_w
        )
    }
}

/// Evaluate the fitted curve at each harmonic of the fundamental.
///
/// A harmonic outside the measured range still gets a value (the
/// boundary polynomial's extension) but is flagged and logged as
/// advisory, since the extension carries no metrological weight.
pub fn harmonic_marks(curve: &SmoothingSpline) -> Vec<HarmonicMark> {
    ORDERS
        .map(|order| {
            let wavelength_nm = FUNDAMENTAL_NM / f64::from(order);
            let eval = curve.evaluate(wavelength_nm);
            if eval.extrapolated {
                log::warn!(
                    "harmonic H{order} at {wavelength_nm:.1} nm lies outside the measured \
                     range; the value is extrapolated and may not be reliable"
                );
            }
            HarmonicMark {
                order,
                wavelength_nm,
                responsivity_a_per_w: eval.responsivity_a_per_w,
                extrapolated: eval.extrapolated,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::loader::nist_dataset;

    fn fitted_curve() -> SmoothingSpline {
        let ds = nist_dataset().unwrap();
        SmoothingSpline::fit(ds.wavelengths_nm(), ds.responsivities_a_per_w()).unwrap()
    }

    #[test]
    fn marks_cover_orders_five_through_ten() {
        let marks = harmonic_marks(&fitted_curve());
        assert_eq!(marks.len(), 6);
        assert_eq!(
            marks.iter().map(|m| m.order).collect::<Vec<_>>(),
            vec![5, 6, 7, 8, 9, 10]
        );
        // All six harmonics of 1035 nm land inside 51.9..255.1 nm.
        assert!(marks.iter().all(|m| !m.extrapolated));
    }

    #[test]
    fn seventh_harmonic_is_small_and_positive() {
        let marks = harmonic_marks(&fitted_curve());
        let h7 = marks.iter().find(|m| m.order == 7).unwrap();

        assert_relative_eq!(h7.wavelength_nm, 1035.0 / 7.0);
        assert!(h7.responsivity_a_per_w.is_finite());
        assert!(h7.responsivity_a_per_w > 0.0);
        // Neighboring table entries are ~2.9e-5 and ~7.7e-5 A/W.
        assert!(h7.responsivity_a_per_w < 1e-3);
    }

    #[test]
    fn label_format_matches_annotation_style() {
        let marks = harmonic_marks(&fitted_curve());
        let h5 = &marks[0];
        assert!(h5.label().starts_with("H5, 207.0 nm: "));
        assert!(h5.label().ends_with(" A/W"));
    }
}
