use anyhow::{Context, Result, bail};

use super::model::CalibrationDataset;

// ---------------------------------------------------------------------------
// Embedded calibration table
// ---------------------------------------------------------------------------

/// Calibration table for the NIST aluminum oxide photodiode SN 448,
/// calibrated July 17, 2019, transcribed from the issued certificate.
///
/// Columns: wavelength (nm), responsivity (mA/W), absolute uncertainty
/// (mA/W, k=2), relative uncertainty (%, k=2).
const NIST_TABLE: &str = "Wavelength (nm)\tResponsivity (mA/W)\tUncertainty (mA/W) k=2\tUncertainty (%) k=2\n\
     51.9\t7.85150\t1.71718\t21.87\n\
     53.7\t8.94460\t0.87438\t9.78\n\
     55.6\t9.87450\t0.74643\t7.56\n\
     58.4\t10.34000\t0.66455\t6.43\n\
     59.9\t11.79000\t0.99163\t8.41\n\
     62.2\t13.02500\t0.88038\t6.76\n\
     63.9\t13.42700\t0.87347\t6.51\n\
     65.7\t13.21800\t0.80872\t6.12\n\
     66.9\t14.45400\t0.95339\t6.60\n\
     68.3\t14.61300\t0.93873\t6.42\n\
     69.9\t15.60700\t1.42770\t9.15\n\
     71.2\t15.56000\t1.16939\t7.52\n\
     73.5\t13.69200\t1.04588\t7.64\n\
     75.2\t14.57400\t0.94395\t6.48\n\
     77.1\t14.85700\t0.90851\t6.12\n\
     80.0\t14.24900\t1.00143\t7.03\n\
     81.8\t14.89700\t0.93127\t6.25\n\
     84.4\t14.85400\t0.95054\t6.40\n\
     86.5\t13.25400\t0.81435\t6.14\n\
     88.6\t12.91000\t0.75156\t5.82\n\
     92.0\t12.48100\t0.71261\t5.71\n\
     116.4\t2.19550\t0.20918\t9.53\n\
     118.0\t1.73280\t0.16525\t9.54\n\
     121.6\t1.08140\t0.10316\t9.54\n\
     125.4\t0.71479\t0.06900\t9.65\n\
     135.4\t0.24339\t0.00779\t3.20\n\
     140.3\t0.13161\t0.00445\t3.38\n\
     144.1\t0.07749\t0.01492\t19.25\n\
     148.7\t0.02897\t0.00114\t3.93\n\
     154.5\t0.01784\t0.00154\t8.65\n\
     160.8\t0.01080\t0.00050\t4.62\n\
     164.8\t0.00942\t0.00097\t10.27\n\
     170.1\t0.00843\t0.00038\t4.53\n\
     175.0\t0.00749\t0.00067\t8.92\n\
     182.3\t0.00666\t0.00118\t17.71\n\
     187.9\t0.00605\t0.00100\t16.54\n\
     193.7\t0.00382\t0.00085\t22.28\n\
     200.0\t0.00293\t0.00052\t17.88\n\
     206.7\t0.00176\t0.00022\t12.30\n\
     215.0\t0.00176\t0.00097\t55.19\n\
     220.0\t0.00129\t0.00104\t80.36\n\
     225.0\t0.00103\t0.00056\t54.48\n\
     230.0\t0.00081\t0.00154\t188.89\n\
     235.0\t0.00029\t0.00152\t525.23\n\
     240.1\t0.00076\t0.00055\t72.49\n\
     245.1\t0.00047\t0.00027\t57.96\n\
     249.9\t0.00025\t0.00201\t797.10\n\
     255.1\t0.00192\t0.00036\t18.59";

/// A cubic smoothing spline needs at least this many points.
const MIN_POINTS: usize = 4;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse the embedded NIST calibration table.
///
/// Responsivity and absolute uncertainty are converted from the table's
/// mA/W to A/W. The table is a fixed asset, not user input: any parse or
/// invariant failure is a transcription bug and aborts startup.
pub fn nist_dataset() -> Result<CalibrationDataset> {
    parse_table(NIST_TABLE).context("parsing embedded NIST calibration table")
}

// ---------------------------------------------------------------------------
// Tab-separated table parser
// ---------------------------------------------------------------------------

/// Parse a tab-separated table with one header row into a dataset.
fn parse_table(table: &str) -> Result<CalibrationDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(table.as_bytes());

    let mut wavelength_nm = Vec::new();
    let mut responsivity_a_per_w = Vec::new();
    let mut uncertainty_a_per_w = Vec::new();
    let mut uncertainty_percent = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {row_no}"))?;

        let field = |idx: usize, name: &str| -> Result<f64> {
            let raw = record.get(idx).unwrap_or("");
            raw.trim()
                .parse::<f64>()
                .with_context(|| format!("row {row_no}, {name}: '{raw}' is not a number"))
        };

        wavelength_nm.push(field(0, "wavelength")?);
        // Source unit is mA/W.
        responsivity_a_per_w.push(field(1, "responsivity")? * 1e-3);
        uncertainty_a_per_w.push(field(2, "uncertainty")? * 1e-3);
        uncertainty_percent.push(field(3, "uncertainty %")?);
    }

    if wavelength_nm.len() < MIN_POINTS {
        bail!(
            "table has {} rows, need at least {MIN_POINTS} for a cubic fit",
            wavelength_nm.len()
        );
    }
    for (i, pair) in wavelength_nm.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            bail!(
                "wavelengths must be strictly increasing, but row {} ({} nm) follows {} nm",
                i + 1,
                pair[1],
                pair[0]
            );
        }
    }
    for (i, (&r, &u)) in responsivity_a_per_w
        .iter()
        .zip(uncertainty_a_per_w.iter())
        .enumerate()
    {
        if r < 0.0 || u < 0.0 {
            bail!("row {i}: negative responsivity or uncertainty");
        }
    }

    Ok(CalibrationDataset::from_columns(
        wavelength_nm,
        responsivity_a_per_w,
        uncertainty_a_per_w,
        uncertainty_percent,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn table_parses_with_expected_shape() {
        let ds = nist_dataset().unwrap();
        assert_eq!(ds.len(), 48);
        assert!(ds
            .wavelengths_nm()
            .windows(2)
            .all(|w| w[1] > w[0]));
        assert_eq!(ds.wavelength_range(), (51.9, 255.1));
    }

    #[test]
    fn first_row_matches_certificate() {
        let ds = nist_dataset().unwrap();
        assert_relative_eq!(ds.wavelengths_nm()[0], 51.9);
        assert_relative_eq!(ds.responsivities_a_per_w()[0], 7.85150e-3);
        assert_relative_eq!(ds.uncertainties_a_per_w()[0], 1.71718e-3);
        assert_relative_eq!(ds.uncertainties_percent()[0], 21.87);
    }

    #[test]
    fn percent_uncertainty_consistent_with_absolute() {
        let ds = nist_dataset().unwrap();
        for m in ds.iter() {
            assert!(m.responsivity_a_per_w > 0.0);
            let derived = 100.0 * m.uncertainty_a_per_w / m.responsivity_a_per_w;
            // The certificate rounds both columns; agreement is to within
            // a couple of percent relative at the smallest responsivities.
            assert_relative_eq!(m.uncertainty_percent, derived, max_relative = 0.02);
        }
    }

    #[test]
    fn non_numeric_field_is_fatal() {
        let table = "wl\tresp\tunc\tpct\n1.0\t2.0\toops\t4.0\n2.0\t2.0\t0.1\t5.0\n3.0\t2.0\t0.1\t5.0\n4.0\t2.0\t0.1\t5.0";
        assert!(parse_table(table).is_err());
    }

    #[test]
    fn short_row_is_fatal() {
        let table = "wl\tresp\tunc\tpct\n1.0\t2.0\t0.1\t5.0\n2.0\t2.0\t0.1\n3.0\t2.0\t0.1\t5.0\n4.0\t2.0\t0.1\t5.0";
        assert!(parse_table(table).is_err());
    }

    #[test]
    fn unsorted_wavelengths_are_fatal() {
        let table = "wl\tresp\tunc\tpct\n2.0\t2.0\t0.1\t5.0\n1.0\t2.0\t0.1\t5.0\n3.0\t2.0\t0.1\t5.0\n4.0\t2.0\t0.1\t5.0";
        assert!(parse_table(table).is_err());
    }

    #[test]
    fn too_few_rows_are_fatal() {
        let table = "wl\tresp\tunc\tpct\n1.0\t2.0\t0.1\t5.0\n2.0\t2.0\t0.1\t5.0";
        assert!(parse_table(table).is_err());
    }
}
