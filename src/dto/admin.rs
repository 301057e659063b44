use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Doctor, Patient};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub specialization: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorList {
    pub items: Vec<Doctor>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientList {
    pub items: Vec<Patient>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClinicStats {
    pub total_doctors: i64,
    pub total_patients: i64,
    pub total_appointments: i64,
    pub total_prescriptions: i64,
}
