//! Field-level validation rules for patient data.
//!
//! Every path that produces a patient value (full construction, partial updates, records read
//! back from storage) funnels through these functions, so a constraint is stated exactly once.

use crate::constants::{MAX_AGE_EXCLUSIVE, MIN_AGE_EXCLUSIVE};
use crate::record::Gender;
use crate::{PatientError, PatientResult};
use pms_types::NonEmptyText;

/// Validates a required free-text field.
///
/// # Errors
///
/// Returns `PatientError::Validation` naming `field` if the value is empty or whitespace only.
/// Accepted values are stored as given.
pub fn required_text(field: &str, value: &str) -> PatientResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|e| PatientError::validation(field, e.to_string()))
}

/// Validates an age in whole years, exclusive at both ends.
pub fn age(value: i64) -> PatientResult<u8> {
    if value <= MIN_AGE_EXCLUSIVE || value >= MAX_AGE_EXCLUSIVE {
        return Err(PatientError::validation(
            "age",
            format!(
                "must be greater than {MIN_AGE_EXCLUSIVE} and less than {MAX_AGE_EXCLUSIVE}, got {value}"
            ),
        ));
    }

    // Bounds above guarantee the value fits.
    Ok(value as u8)
}

/// Validates a body measurement (height in metres, weight in kilograms).
pub fn positive_measure(field: &str, value: f64) -> PatientResult<f64> {
    if !value.is_finite() {
        return Err(PatientError::validation(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(PatientError::validation(
            field,
            format!("must be greater than 0, got {value}"),
        ));
    }
    Ok(value)
}

/// Validates a gender against the fixed enumeration.
pub fn gender(value: &str) -> PatientResult<Gender> {
    value.parse()
}
