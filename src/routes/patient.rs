use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::{
        admin::DoctorList,
        appointments::PatientAppointmentList,
        prescriptions::PatientPrescriptionList,
        profile::UpdatePatientProfileRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Patient,
    response::ApiResponse,
    services::{appointment_service, prescription_service, profile_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/appointments", get(list_appointments))
        .route("/prescriptions", get(list_prescriptions))
        .route("/doctors", get(list_doctors))
}

#[utoipa::path(
    get,
    path = "/api/patient/profile",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<Patient>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Patient"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Patient>>> {
    let resp = profile_service::get_patient_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/patient/profile",
    request_body = UpdatePatientProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<Patient>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Patient"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdatePatientProfileRequest>,
) -> AppResult<Json<ApiResponse<Patient>>> {
    let resp = profile_service::update_patient_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/patient/appointments",
    responses(
        (status = 200, description = "Own appointments", body = ApiResponse<PatientAppointmentList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Patient"
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PatientAppointmentList>>> {
    let resp = appointment_service::list_for_patient(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/patient/prescriptions",
    responses(
        (status = 200, description = "Own prescriptions", body = ApiResponse<PatientPrescriptionList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Patient"
)]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PatientPrescriptionList>>> {
    let resp = prescription_service::list_for_patient(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/patient/doctors",
    responses(
        (status = 200, description = "Doctor directory", body = ApiResponse<DoctorList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Patient"
)]
pub async fn list_doctors(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DoctorList>>> {
    let resp = profile_service::list_doctors_for_patient(&state, &user).await?;
    Ok(Json(resp))
}
