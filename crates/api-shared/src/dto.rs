//! Request and response bodies exchanged with API clients.
//!
//! These mirror the core types but carry OpenAPI schemas and stay stable on the wire even if
//! the core model changes shape.

use indexmap::IndexMap;
use pms_core::{Patient, PatientFields, RecordSet};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Plain confirmation message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body. `detail` names the cause, for example the failing field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

/// A stored patient including derived fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    #[schema(example = "P001")]
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: u8,
    #[schema(example = "female")]
    pub gender: String,
    /// Height in metres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    pub bmi: f64,
    #[schema(example = "normal")]
    pub verdict: String,
}

impl From<&Patient> for PatientRes {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id().to_string(),
            name: patient.name().to_string(),
            city: patient.city().to_string(),
            age: patient.age(),
            gender: patient.gender().to_string(),
            height: patient.height(),
            weight: patient.weight(),
            bmi: patient.bmi(),
            verdict: patient.verdict().to_string(),
        }
    }
}

/// Body of `POST /create`: every stored field is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    #[schema(example = "P001")]
    pub id: String,
    pub name: String,
    pub city: String,
    /// Whole years, greater than 0 and less than 120.
    pub age: i64,
    /// One of `male`, `female`, `others`.
    pub gender: String,
    /// Metres, greater than 0.
    pub height: f64,
    /// Kilograms, greater than 0.
    pub weight: f64,
}

impl From<CreatePatientReq> for PatientFields {
    fn from(req: CreatePatientReq) -> Self {
        PatientFields {
            id: req.id,
            name: req.name,
            city: req.city,
            age: req.age,
            gender: req.gender,
            height: req.height,
            weight: req.weight,
        }
    }
}

/// Body of `PUT /edit/{id}`. Omitted fields keep their stored value; `null` is rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub message: String,
    pub patient: PatientRes,
}

/// Every patient keyed by id, in stored order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub data: IndexMap<String, PatientRes>,
}

impl From<&RecordSet> for ListPatientsRes {
    fn from(records: &RecordSet) -> Self {
        Self {
            data: records
                .iter()
                .map(|p| (p.id().to_string(), PatientRes::from(p)))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SortedPatientsRes {
    pub data: Vec<PatientRes>,
}

impl From<&[Patient]> for SortedPatientsRes {
    fn from(patients: &[Patient]) -> Self {
        Self {
            data: patients.iter().map(PatientRes::from).collect(),
        }
    }
}
