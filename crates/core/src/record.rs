//! The patient record model.
//!
//! [`PatientFields`] carries raw, unvalidated values exactly as a client or the record file
//! supplies them. [`Patient`] is the validated entity; [`Patient::new`] is the only way to
//! build one. Body mass index and verdict are methods computed from the current height and
//! weight rather than stored state, so they cannot drift from the measurements.

use crate::constants::{BMI_NORMAL_FROM, BMI_OBESE_FROM, BMI_OVERWEIGHT_FROM};
use crate::{validation, PatientError, PatientResult};
use pms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recorded gender of a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Others];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| {
                PatientError::validation(
                    "gender",
                    format!("must be one of 'male', 'female', 'others', got '{s}'"),
                )
            })
    }
}

/// Health classification derived from body mass index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Verdict {
    /// Classifies a BMI value. Each band includes its lower bound.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < BMI_NORMAL_FROM {
            Verdict::Underweight
        } else if bmi < BMI_OVERWEIGHT_FROM {
            Verdict::Normal
        } else if bmi < BMI_OBESE_FROM {
            Verdict::Overweight
        } else {
            Verdict::Obese
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Underweight => "underweight",
            Verdict::Normal => "normal",
            Verdict::Overweight => "overweight",
            Verdict::Obese => "obese",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `weight / height²`, rounded to two decimal places with ties to even.
pub fn body_mass_index(height: f64, weight: f64) -> f64 {
    let raw = weight / (height * height);
    (raw * 100.0).round_ties_even() / 100.0
}

/// Raw patient field values prior to validation.
///
/// Derived values (`bmi`, `verdict`) and unknown keys present in the source document are
/// ignored when deserialising.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientFields {
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: i64,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
}

/// A validated patient record.
#[derive(Clone, Debug, PartialEq)]
pub struct Patient {
    id: NonEmptyText,
    name: NonEmptyText,
    city: NonEmptyText,
    age: u8,
    gender: Gender,
    height: f64,
    weight: f64,
}

impl Patient {
    /// Validates every field and builds a patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` naming the first field that breaks its constraint:
    /// - `id`, `name`, `city` empty or whitespace only,
    /// - `age` outside `(0, 120)`,
    /// - `gender` not one of `male`, `female`, `others`,
    /// - `height` or `weight` not a positive finite number.
    pub fn new(fields: PatientFields) -> PatientResult<Self> {
        Ok(Self {
            id: validation::required_text("id", &fields.id)?,
            name: validation::required_text("name", &fields.name)?,
            city: validation::required_text("city", &fields.city)?,
            age: validation::age(fields.age)?,
            gender: validation::gender(&fields.gender)?,
            height: validation::positive_measure("height", fields.height)?,
            weight: validation::positive_measure("weight", fields.weight)?,
        })
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn city(&self) -> &str {
        self.city.as_str()
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Height in metres.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bmi(&self) -> f64 {
        body_mass_index(self.height, self.weight)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_bmi(self.bmi())
    }

    /// Raw snapshot of the stored fields, used as the base of a partial update.
    pub fn to_fields(&self) -> PatientFields {
        PatientFields {
            id: self.id.to_string(),
            name: self.name.to_string(),
            city: self.city.to_string(),
            age: i64::from(self.age),
            gender: self.gender.as_str().to_string(),
            height: self.height,
            weight: self.weight,
        }
    }
}

impl TryFrom<PatientFields> for Patient {
    type Error = PatientError;

    fn try_from(fields: PatientFields) -> Result<Self, Self::Error> {
        Patient::new(fields)
    }
}

#[derive(Serialize)]
struct PatientSnapshot<'a> {
    id: &'a str,
    name: &'a str,
    city: &'a str,
    age: u8,
    gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl Serialize for Patient {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        PatientSnapshot {
            id: self.id(),
            name: self.name(),
            city: self.city(),
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            bmi: self.bmi(),
            verdict: self.verdict(),
        }
        .serialize(serializer)
    }
}
