use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        appointments::{
            AppointmentList, AvailableSlots, PatientRoster, ScheduleAppointmentRequest,
        },
        prescriptions::{CreatePrescriptionRequest, PrescriptionList, UpdatePrescriptionRequest},
        profile::UpdateDoctorProfileRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Appointment, Doctor, Prescription},
    response::ApiResponse,
    routes::params::{AppointmentListQuery, PrescriptionListQuery, SlotQuery},
    services::{appointment_service, prescription_service, profile_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/schedule-appointment", post(schedule_appointment))
        .route("/appointments", get(list_appointments))
        .route("/appointments/{id}/{status}", patch(update_appointment_status))
        .route("/available-slots", get(available_slots))
        .route("/patients", get(list_patients))
        .route("/prescriptions", get(list_prescriptions).post(create_prescription))
        .route(
            "/prescriptions/{id}",
            put(update_prescription).delete(delete_prescription),
        )
}

#[utoipa::path(
    get,
    path = "/api/doctor/profile",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<Doctor>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Doctor>>> {
    let resp = profile_service::get_doctor_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/doctor/profile",
    request_body = UpdateDoctorProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<Doctor>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateDoctorProfileRequest>,
) -> AppResult<Json<ApiResponse<Doctor>>> {
    let resp = profile_service::update_doctor_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/doctor/schedule-appointment",
    request_body = ScheduleAppointmentRequest,
    responses(
        (status = 200, description = "Appointment scheduled", body = ApiResponse<Appointment>),
        (status = 400, description = "Invalid slot or booked"),
        (status = 404, description = "Unknown patient")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn schedule_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ScheduleAppointmentRequest>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    let resp = appointment_service::schedule(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/doctor/appointments",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("date" = Option<String>, Query, description = "Filter by date (YYYY-MM-DD)"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Own appointments", body = ApiResponse<AppointmentList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> AppResult<Json<ApiResponse<AppointmentList>>> {
    let resp = appointment_service::list_for_doctor(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/doctor/appointments/{id}/{status}",
    params(
        ("id" = Uuid, Path, description = "Appointment ID"),
        ("status" = String, Path, description = "scheduled | completed | cancelled")
    ),
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<Appointment>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Not found or not yours")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, status)): Path<(Uuid, String)>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    let resp = appointment_service::update_status(&state, &user, id, &status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/doctor/available-slots",
    params(
        ("date" = String, Query, description = "Date to check (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Free slots in canonical order", body = ApiResponse<AvailableSlots>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn available_slots(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SlotQuery>,
) -> AppResult<Json<ApiResponse<AvailableSlots>>> {
    let resp = appointment_service::available_slots(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/doctor/patients",
    responses(
        (status = 200, description = "Patients with last and next visit", body = ApiResponse<PatientRoster>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn list_patients(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PatientRoster>>> {
    let resp = appointment_service::patients_with_appointments(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/doctor/prescriptions",
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription created", body = ApiResponse<Prescription>),
        (status = 404, description = "Unknown patient")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn create_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePrescriptionRequest>,
) -> AppResult<Json<ApiResponse<Prescription>>> {
    let resp = prescription_service::create(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/doctor/prescriptions",
    params(
        ("patient_id" = Option<Uuid>, Query, description = "Filter by patient")
    ),
    responses(
        (status = 200, description = "Own prescriptions", body = ApiResponse<PrescriptionList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PrescriptionListQuery>,
) -> AppResult<Json<ApiResponse<PrescriptionList>>> {
    let resp = prescription_service::list_for_doctor(&state, &user, query.patient_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/doctor/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    request_body = UpdatePrescriptionRequest,
    responses(
        (status = 200, description = "Prescription updated", body = ApiResponse<Prescription>),
        (status = 404, description = "Not found or not yours")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn update_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePrescriptionRequest>,
) -> AppResult<Json<ApiResponse<Prescription>>> {
    let resp = prescription_service::update(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/doctor/prescriptions/{id}",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription deleted"),
        (status = 404, description = "Not found or not yours")
    ),
    security(("bearer_auth" = [])),
    tag = "Doctor"
)]
pub async fn delete_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = prescription_service::delete(&state, &user, id).await?;
    Ok(Json(resp))
}
