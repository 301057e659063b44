use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        admins::{Column as AdminCol, Entity as Admins},
        doctors::{Column as DoctorCol, Entity as Doctors},
        patients::{ActiveModel as PatientActive, Column as PatientCol, Entity as Patients},
    },
    error::{AppError, AppResult},
    models::{Patient, Role},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// An unparseable stored hash counts as a mismatch, so a malformed record
/// fails the same way as a wrong password.
fn password_matches(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Every login failure returns this exact response. Unknown email, wrong
/// role, malformed record, and wrong password must be indistinguishable to
/// the caller.
fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid email or password".into())
}

/// Single login path for all three roles. The role selects the backing
/// collection; everything after the lookup is shared.
pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest {
        email,
        password,
        role,
    } = payload;

    let credential: Option<(Uuid, String)> = match role {
        Role::Patient => Patients::find()
            .filter(PatientCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .map(|p| (p.id, p.password_hash)),
        Role::Doctor => Doctors::find()
            .filter(DoctorCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .map(|d| (d.id, d.password_hash)),
        Role::Admin => Admins::find()
            .filter(AdminCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .map(|a| (a.id, a.password_hash)),
    };

    let (user_id, stored_hash) = credential.ok_or_else(invalid_credentials)?;

    if stored_hash.is_empty() {
        return Err(invalid_credentials());
    }

    if !password_matches(&password, &stored_hash) {
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(user_id, role)?;

    if let Err(err) = log_audit(state, Some(user_id), Some(role), "login", None, None).await {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token, role },
        None,
    ))
}

/// Patient self-signup.
pub async fn register_patient(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Patient>> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("name and email are required".into()));
    }
    if payload.password.len() < 6 {
        return Err(AppError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }

    let exists = Patients::find()
        .filter(PatientCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("email is already taken".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let patient = PatientActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        name: Set(payload.name),
        phone: Set(payload.phone),
        date_of_birth: Set(payload.date_of_birth),
        gender: Set(payload.gender),
        address: Set(payload.address),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(patient.id),
        Some(Role::Patient),
        "patient_register",
        Some("patients"),
        Some(serde_json::json!({ "patient_id": patient.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Patient registered",
        patient_from_entity(patient),
        Some(Meta::empty()),
    ))
}

pub(crate) fn patient_from_entity(model: crate::entity::patients::Model) -> Patient {
    Patient {
        id: model.id,
        email: model.email,
        name: model.name,
        phone: model.phone,
        date_of_birth: model.date_of_birth,
        gender: model.gender,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
