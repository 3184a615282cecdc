//! Partial updates of a patient record.
//!
//! A [`PatientUpdate`] holds only the changes a caller explicitly supplied. Keys omitted from
//! the request are simply absent, which keeps "leave unchanged" distinct from any value the
//! caller might send. Each change is validated on its own when decoded; the merged record is
//! validated again as a whole when the update is applied.

use crate::record::{Gender, PatientFields};
use crate::{validation, PatientError, PatientResult};
use pms_types::NonEmptyText;
use serde_json::{Map, Value};

/// A single validated field change.
#[derive(Clone, Debug, PartialEq)]
pub enum PatientChange {
    Name(NonEmptyText),
    City(NonEmptyText),
    Age(u8),
    Gender(Gender),
    Height(f64),
    Weight(f64),
}

impl PatientChange {
    /// Name of the field this change targets.
    pub fn field(&self) -> &'static str {
        match self {
            PatientChange::Name(_) => "name",
            PatientChange::City(_) => "city",
            PatientChange::Age(_) => "age",
            PatientChange::Gender(_) => "gender",
            PatientChange::Height(_) => "height",
            PatientChange::Weight(_) => "weight",
        }
    }

    fn apply_to(&self, fields: &mut PatientFields) {
        match self {
            PatientChange::Name(name) => fields.name = name.to_string(),
            PatientChange::City(city) => fields.city = city.to_string(),
            PatientChange::Age(age) => fields.age = i64::from(*age),
            PatientChange::Gender(gender) => fields.gender = gender.as_str().to_string(),
            PatientChange::Height(height) => fields.height = *height,
            PatientChange::Weight(weight) => fields.weight = *weight,
        }
    }
}

/// Sparse set of changes to an existing patient. Identity is never part of an update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientUpdate {
    changes: Vec<PatientChange>,
}

impl PatientUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a change, replacing any earlier change to the same field.
    pub fn with(mut self, change: PatientChange) -> Self {
        self.changes.retain(|c| c.field() != change.field());
        self.changes.push(change);
        self
    }

    pub fn changes(&self) -> &[PatientChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Decodes an update from a JSON object.
    ///
    /// Only keys present in `object` produce changes. `id`, the derived `bmi`/`verdict` and
    /// unrecognised keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` if a present key is `null`, has the wrong JSON type,
    /// or breaks the field's constraint.
    pub fn from_json(object: &Map<String, Value>) -> PatientResult<Self> {
        let mut update = PatientUpdate::new();

        if let Some(value) = present("name", object)? {
            let text = validation::required_text("name", expect_str("name", value)?)?;
            update = update.with(PatientChange::Name(text));
        }
        if let Some(value) = present("city", object)? {
            let text = validation::required_text("city", expect_str("city", value)?)?;
            update = update.with(PatientChange::City(text));
        }
        if let Some(value) = present("age", object)? {
            let age = value
                .as_i64()
                .ok_or_else(|| PatientError::validation("age", "must be an integer"))?;
            update = update.with(PatientChange::Age(validation::age(age)?));
        }
        if let Some(value) = present("gender", object)? {
            let gender = validation::gender(expect_str("gender", value)?)?;
            update = update.with(PatientChange::Gender(gender));
        }
        if let Some(value) = present("height", object)? {
            let height = validation::positive_measure("height", expect_f64("height", value)?)?;
            update = update.with(PatientChange::Height(height));
        }
        if let Some(value) = present("weight", object)? {
            let weight = validation::positive_measure("weight", expect_f64("weight", value)?)?;
            update = update.with(PatientChange::Weight(weight));
        }

        Ok(update)
    }

    /// Overlays the changes onto a raw snapshot. Fields without a change keep their value.
    pub fn apply_to(&self, fields: &mut PatientFields) {
        for change in &self.changes {
            change.apply_to(fields);
        }
    }
}

fn present<'a>(key: &str, object: &'a Map<String, Value>) -> PatientResult<Option<&'a Value>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Null) => Err(PatientError::validation(key, "may not be null")),
        Some(value) => Ok(Some(value)),
    }
}

fn expect_str<'a>(key: &str, value: &'a Value) -> PatientResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| PatientError::validation(key, "must be a string"))
}

fn expect_f64(key: &str, value: &Value) -> PatientResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| PatientError::validation(key, "must be a number"))
}
