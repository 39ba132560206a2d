/// Data layer: the embedded calibration table and its parsed form.
///
/// Architecture:
/// ```text
///  embedded NIST table (tab-separated text)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows, mA/W → A/W, check invariants
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ CalibrationDataset  │  four parallel columns, row view
///   └────────────────────┘
/// ```
pub mod loader;
pub mod model;
