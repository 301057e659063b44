use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admin::{AddAdminRequest, AddDoctorRequest, ClinicStats, DoctorList, PatientList},
    entity::{
        admins::{ActiveModel as AdminActive, Column as AdminCol, Entity as Admins},
        appointments::Entity as Appointments,
        doctors::{ActiveModel as DoctorActive, Column as DoctorCol, Entity as Doctors},
        patients::{Column as PatientCol, Entity as Patients},
        prescriptions::Entity as Prescriptions,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Admin, Doctor},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{auth_service, profile_service::doctor_from_entity},
    state::AppState,
};

pub async fn add_doctor(
    state: &AppState,
    user: &AuthUser,
    payload: AddDoctorRequest,
) -> AppResult<ApiResponse<Doctor>> {
    ensure_admin(user)?;

    if payload.name.trim().is_empty() || payload.specialization.trim().is_empty() {
        return Err(AppError::BadRequest(
            "name and specialization are required".into(),
        ));
    }

    let exists = Doctors::find()
        .filter(DoctorCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("email is already taken".into()));
    }

    let password_hash = auth_service::hash_password(&payload.password)?;

    let doctor = DoctorActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        name: Set(payload.name),
        specialization: Set(payload.specialization),
        phone: Set(payload.phone),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "doctor_add",
        Some("doctors"),
        Some(serde_json::json!({ "doctor_id": doctor.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Doctor added",
        doctor_from_entity(doctor),
        Some(Meta::empty()),
    ))
}

pub async fn add_admin(
    state: &AppState,
    user: &AuthUser,
    payload: AddAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    ensure_admin(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let exists = Admins::find()
        .filter(AdminCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("email is already taken".into()));
    }

    let password_hash = auth_service::hash_password(&payload.password)?;

    let admin = AdminActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        name: Set(payload.name),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "admin_add",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": admin.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Admin added",
        Admin {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            created_at: admin.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_doctors(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<DoctorList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Doctors::find().order_by_asc(DoctorCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(doctor_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Doctors", DoctorList { items }, Some(meta)))
}

pub async fn list_patients(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PatientList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Patients::find().order_by_asc(PatientCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(auth_service::patient_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Patients",
        PatientList { items },
        Some(meta),
    ))
}

/// Global dashboard counts.
pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ClinicStats>> {
    ensure_admin(user)?;

    let total_doctors = Doctors::find().count(&state.orm).await? as i64;
    let total_patients = Patients::find().count(&state.orm).await? as i64;
    let total_appointments = Appointments::find().count(&state.orm).await? as i64;
    let total_prescriptions = Prescriptions::find().count(&state.orm).await? as i64;

    let data = ClinicStats {
        total_doctors,
        total_patients,
        total_appointments,
        total_prescriptions,
    };
    Ok(ApiResponse::success("Stats", data, Some(Meta::empty())))
}
