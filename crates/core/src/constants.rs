//! Constants used throughout the PMS core crate.

/// Default record file when no explicit location is configured.
pub const DEFAULT_DATA_FILE: &str = "patients.json";

/// Ages must be strictly greater than this.
pub const MIN_AGE_EXCLUSIVE: i64 = 0;

/// Ages must be strictly less than this.
pub const MAX_AGE_EXCLUSIVE: i64 = 120;

/// Lower bound (inclusive) of the `normal` BMI band.
pub const BMI_NORMAL_FROM: f64 = 18.5;

/// Lower bound (inclusive) of the `overweight` BMI band.
pub const BMI_OVERWEIGHT_FROM: f64 = 25.0;

/// Lower bound (inclusive) of the `obese` BMI band.
pub const BMI_OBESE_FROM: f64 = 30.0;

/// Indentation used when writing the record file.
pub const RECORD_FILE_INDENT: &[u8] = b"    ";
