//! The record set: every patient, keyed by id, in enumeration order.

use crate::record::Patient;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// All stored patients, the unit of persistence.
///
/// Keys are always taken from the patient's own id, so a key can never disagree with the
/// record it points to. Enumeration follows insertion order; removing a record keeps the
/// relative order of the rest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordSet {
    records: IndexMap<String, Patient>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.records.get(id)
    }

    /// Inserts or replaces a patient. A replaced patient keeps its position.
    pub fn insert(&mut self, patient: Patient) -> Option<Patient> {
        self.records.insert(patient.id().to_string(), patient)
    }

    pub fn remove(&mut self, id: &str) -> Option<Patient> {
        self.records.shift_remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.records.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn into_patients(self) -> Vec<Patient> {
        self.records.into_values().collect()
    }
}

impl FromIterator<Patient> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Patient>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for patient in iter {
            set.insert(patient);
        }
        set
    }
}

impl Serialize for RecordSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (id, patient) in &self.records {
            map.serialize_entry(id, patient)?;
        }
        map.end()
    }
}
