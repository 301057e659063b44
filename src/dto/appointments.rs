use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Appointment, Patient};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleAppointmentRequest {
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentList {
    pub items: Vec<Appointment>,
}

/// An appointment as seen from the patient side, with the doctor resolved
/// by reference.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatientAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientAppointmentList {
    pub items: Vec<PatientAppointment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableSlots {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

/// A patient on a doctor's roster, with their most recent past visit and
/// their next upcoming appointment.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatientWithVisits {
    pub patient: Patient,
    pub last_visit: Option<NaiveDate>,
    pub next_appointment: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientRoster {
    pub items: Vec<PatientWithVisits>,
}
