use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::admin::{AddAdminRequest, AddDoctorRequest, ClinicStats, DoctorList, PatientList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Admin, Doctor},
    response::ApiResponse,
    routes::params::Pagination,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list_doctors).post(add_doctor))
        .route("/admins", post(add_admin))
        .route("/patients", get(list_patients))
        .route("/stats", get(stats))
}

#[utoipa::path(
    post,
    path = "/api/admin/doctors",
    request_body = AddDoctorRequest,
    responses(
        (status = 200, description = "Doctor added (admin only)", body = ApiResponse<Doctor>),
        (status = 400, description = "Duplicate email"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_doctor(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddDoctorRequest>,
) -> AppResult<Json<ApiResponse<Doctor>>> {
    let resp = admin_service::add_doctor(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/admins",
    request_body = AddAdminRequest,
    responses(
        (status = 200, description = "Admin added (admin only)", body = ApiResponse<Admin>),
        (status = 400, description = "Duplicate email"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddAdminRequest>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    let resp = admin_service::add_admin(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/doctors",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All doctors (admin only)", body = ApiResponse<DoctorList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_doctors(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<DoctorList>>> {
    let resp = admin_service::list_doctors(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/patients",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All patients (admin only)", body = ApiResponse<PatientList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_patients(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PatientList>>> {
    let resp = admin_service::list_patients(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Global counts (admin only)", body = ApiResponse<ClinicStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ClinicStats>>> {
    let resp = admin_service::stats(&state, &user).await?;
    Ok(Json(resp))
}
