use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder};

use crate::{
    dto::{
        admin::DoctorList,
        profile::{UpdateDoctorProfileRequest, UpdatePatientProfileRequest},
    },
    entity::{
        doctors::{
            ActiveModel as DoctorActive, Column as DoctorCol, Entity as Doctors,
            Model as DoctorModel,
        },
        patients::{ActiveModel as PatientActive, Entity as Patients},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Doctor, Patient, Role},
    response::{ApiResponse, Meta},
    services::auth_service::patient_from_entity,
    state::AppState,
};

/// The profile lookup is by token id. A verified token whose account has
/// since been deleted lands here and gets a 404.
pub async fn get_doctor_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Doctor>> {
    ensure_role(user, Role::Doctor)?;

    let doctor = Doctors::find_by_id(user.user_id).one(&state.orm).await?;
    let doctor = match doctor {
        Some(d) => d,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Profile",
        doctor_from_entity(doctor),
        Some(Meta::empty()),
    ))
}

pub async fn update_doctor_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateDoctorProfileRequest,
) -> AppResult<ApiResponse<Doctor>> {
    ensure_role(user, Role::Doctor)?;

    let existing = Doctors::find_by_id(user.user_id).one(&state.orm).await?;
    let existing = match existing {
        Some(d) => d,
        None => return Err(AppError::NotFound),
    };

    let mut active: DoctorActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(specialization) = payload.specialization {
        active.specialization = Set(specialization);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Profile updated",
        doctor_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn get_patient_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Patient>> {
    ensure_role(user, Role::Patient)?;

    let patient = Patients::find_by_id(user.user_id).one(&state.orm).await?;
    let patient = match patient {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Profile",
        patient_from_entity(patient),
        Some(Meta::empty()),
    ))
}

pub async fn update_patient_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdatePatientProfileRequest,
) -> AppResult<ApiResponse<Patient>> {
    ensure_role(user, Role::Patient)?;

    let existing = Patients::find_by_id(user.user_id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: PatientActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(date_of_birth) = payload.date_of_birth {
        active.date_of_birth = Set(Some(date_of_birth));
    }
    if let Some(gender) = payload.gender {
        active.gender = Set(Some(gender));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Profile updated",
        patient_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Doctor directory for patients picking where to book.
pub async fn list_doctors_for_patient(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DoctorList>> {
    ensure_role(user, Role::Patient)?;

    let items = Doctors::find()
        .order_by_asc(DoctorCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(doctor_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Doctors",
        DoctorList { items },
        Some(Meta::empty()),
    ))
}

pub(crate) fn doctor_from_entity(model: DoctorModel) -> Doctor {
    Doctor {
        id: model.id,
        email: model.email,
        name: model.name,
        specialization: model.specialization,
        phone: model.phone,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
