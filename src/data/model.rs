// ---------------------------------------------------------------------------
// Measurement – one row of the calibration table
// ---------------------------------------------------------------------------

/// A single calibration point as reported by NIST.
///
/// Wavelength is in nm; responsivity and its absolute uncertainty are in
/// A/W (already converted from the table's mA/W). Uncertainties are k=2
/// (95% coverage).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub wavelength_nm: f64,
    pub responsivity_a_per_w: f64,
    pub uncertainty_a_per_w: f64,
    pub uncertainty_percent: f64,
}

// ---------------------------------------------------------------------------
// CalibrationDataset – the complete parsed table
// ---------------------------------------------------------------------------

/// The full calibration dataset as four parallel columns.
///
/// Column layout keeps the fitter's input cheap to borrow (`&[f64]` slices)
/// while [`CalibrationDataset::iter`] provides a per-row view for tables
/// and error bars. Wavelengths are strictly increasing; the loader rejects
/// anything else.
#[derive(Debug, Clone)]
pub struct CalibrationDataset {
    wavelength_nm: Vec<f64>,
    responsivity_a_per_w: Vec<f64>,
    uncertainty_a_per_w: Vec<f64>,
    uncertainty_percent: Vec<f64>,
}

impl CalibrationDataset {
    /// Assemble a dataset from already-validated parallel columns.
    ///
    /// The loader is the only constructor call site; it guarantees equal
    /// column lengths, strictly increasing wavelengths, and non-negative
    /// responsivities and uncertainties before calling this.
    pub(crate) fn from_columns(
        wavelength_nm: Vec<f64>,
        responsivity_a_per_w: Vec<f64>,
        uncertainty_a_per_w: Vec<f64>,
        uncertainty_percent: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(wavelength_nm.len(), responsivity_a_per_w.len());
        debug_assert_eq!(wavelength_nm.len(), uncertainty_a_per_w.len());
        debug_assert_eq!(wavelength_nm.len(), uncertainty_percent.len());

        CalibrationDataset {
            wavelength_nm,
            responsivity_a_per_w,
            uncertainty_a_per_w,
            uncertainty_percent,
        }
    }

    /// Number of calibration points.
    pub fn len(&self) -> usize {
        self.wavelength_nm.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.wavelength_nm.is_empty()
    }

    /// Wavelength column (nm), strictly increasing.
    pub fn wavelengths_nm(&self) -> &[f64] {
        &self.wavelength_nm
    }

    /// Responsivity column (A/W).
    pub fn responsivities_a_per_w(&self) -> &[f64] {
        &self.responsivity_a_per_w
    }

    /// Absolute k=2 uncertainty column (A/W).
    pub fn uncertainties_a_per_w(&self) -> &[f64] {
        &self.uncertainty_a_per_w
    }

    /// Relative k=2 uncertainty column (%).
    pub fn uncertainties_percent(&self) -> &[f64] {
        &self.uncertainty_percent
    }

    /// The measured wavelength span `(min, max)` in nm.
    pub fn wavelength_range(&self) -> (f64, f64) {
        // Non-empty and sorted by construction.
        (
            self.wavelength_nm[0],
            self.wavelength_nm[self.wavelength_nm.len() - 1],
        )
    }

    /// Row-wise view over the columns.
    pub fn iter(&self) -> impl Iterator<Item = Measurement> + '_ {
        (0..self.len()).map(move |i| Measurement {
            wavelength_nm: self.wavelength_nm[i],
            responsivity_a_per_w: self.responsivity_a_per_w[i],
            uncertainty_a_per_w: self.uncertainty_a_per_w[i],
            uncertainty_percent: self.uncertainty_percent[i],
        })
    }
}
