use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{AddAdminRequest, AddDoctorRequest, ClinicStats, DoctorList, PatientList},
        appointments::{
            AppointmentList, AvailableSlots, PatientAppointment, PatientAppointmentList,
            PatientRoster, PatientWithVisits, ScheduleAppointmentRequest,
        },
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        prescriptions::{
            CreatePrescriptionRequest, PatientPrescription, PatientPrescriptionList,
            PrescriptionList, UpdatePrescriptionRequest,
        },
        profile::{UpdateDoctorProfileRequest, UpdatePatientProfileRequest},
    },
    models::{Admin, Appointment, Doctor, Patient, Prescription},
    response::{ApiResponse, Meta},
    routes::{admin, auth, doctor, health, params, patient},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        patient::get_profile,
        patient::update_profile,
        patient::list_appointments,
        patient::list_prescriptions,
        patient::list_doctors,
        doctor::get_profile,
        doctor::update_profile,
        doctor::schedule_appointment,
        doctor::list_appointments,
        doctor::update_appointment_status,
        doctor::available_slots,
        doctor::list_patients,
        doctor::create_prescription,
        doctor::list_prescriptions,
        doctor::update_prescription,
        doctor::delete_prescription,
        admin::add_doctor,
        admin::add_admin,
        admin::list_doctors,
        admin::list_patients,
        admin::stats
    ),
    components(
        schemas(
            Patient,
            Doctor,
            Admin,
            Appointment,
            Prescription,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            ScheduleAppointmentRequest,
            AppointmentList,
            PatientAppointment,
            PatientAppointmentList,
            AvailableSlots,
            PatientWithVisits,
            PatientRoster,
            CreatePrescriptionRequest,
            UpdatePrescriptionRequest,
            PrescriptionList,
            PatientPrescription,
            PatientPrescriptionList,
            UpdateDoctorProfileRequest,
            UpdatePatientProfileRequest,
            AddDoctorRequest,
            AddAdminRequest,
            DoctorList,
            PatientList,
            ClinicStats,
            params::Pagination,
            params::AppointmentListQuery,
            params::SlotQuery,
            params::PrescriptionListQuery,
            Meta,
            ApiResponse<LoginResponse>,
            ApiResponse<Appointment>,
            ApiResponse<AppointmentList>,
            ApiResponse<AvailableSlots>,
            ApiResponse<PatientRoster>,
            ApiResponse<Prescription>,
            ApiResponse<PrescriptionList>,
            ApiResponse<ClinicStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Patient", description = "Patient-scoped endpoints"),
        (name = "Doctor", description = "Doctor-scoped endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
