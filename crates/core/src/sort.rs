//! Ordering of patients by a numeric measurement.

use crate::record::Patient;
use crate::{PatientError, PatientResult};
use std::str::FromStr;

/// Fields a listing can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Height, SortField::Weight, SortField::Bmi];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }

    /// Numeric sort key of `patient` for this field.
    pub fn key(self, patient: &Patient) -> f64 {
        match self {
            SortField::Height => patient.height(),
            SortField::Weight => patient.weight(),
            SortField::Bmi => patient.bmi(),
        }
    }
}

impl FromStr for SortField {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                PatientError::InvalidArgument(
                    "Invalid field. Choose from ['height', 'weight', 'bmi']".into(),
                )
            })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses an optional order, defaulting to ascending when absent.
    pub fn parse_optional(value: Option<&str>) -> PatientResult<Self> {
        value.map(str::parse::<SortOrder>).transpose().map(Option::unwrap_or_default)
    }
}

impl FromStr for SortOrder {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(PatientError::InvalidArgument(
                "Order must be 'asc' or 'desc'".into(),
            )),
        }
    }
}

/// Sorts patients by `field`.
///
/// The ascending sort is stable. Descending is the exact reversal of the ascending result,
/// so patients with equal keys appear in reverse encounter order.
pub fn sort_patients(mut patients: Vec<Patient>, field: SortField, order: SortOrder) -> Vec<Patient> {
    patients.sort_by(|a, b| field.key(a).total_cmp(&field.key(b)));
    if order == SortOrder::Desc {
        patients.reverse();
    }
    patients
}
