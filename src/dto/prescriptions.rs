use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Prescription;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePrescriptionRequest {
    pub patient_id: Uuid,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePrescriptionRequest {
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrescriptionList {
    pub items: Vec<Prescription>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientPrescription {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientPrescriptionList {
    pub items: Vec<PatientPrescription>,
}
