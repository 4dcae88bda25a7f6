//! Unit normalization for growth and retention inputs.
//!
//! Sources report both decimal (0.25) and percentage (25) forms.
//! The cutoffs below are deliberate: a literal 0.5% growth entry is
//! read as 50%, and retention below 2% is read as a ratio. Values in
//! the ambiguous band are the operator's responsibility.

/// Normalize a growth value to percentage form.
///
/// Decimal ratios strictly between -1 and 1 (and nonzero) are scaled
/// by 100; everything else passes through.
pub fn normalize_growth(value: Option<f64>) -> Option<f64> {
    let v = value?;
    if v > -1.0 && v < 1.0 && v != 0.0 {
        Some(v * 100.0)
    } else {
        Some(v)
    }
}

/// Normalize a retention/GR metric to percentage form.
///
/// Values below 2.0 are treated as decimal ratios and scaled by 100.
pub fn normalize_retention(value: Option<f64>) -> Option<f64> {
    let v = value?;
    if v < 2.0 {
        Some(v * 100.0)
    } else {
        Some(v)
    }
}
