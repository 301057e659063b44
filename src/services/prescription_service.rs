use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::prescriptions::{
        CreatePrescriptionRequest, PatientPrescription, PatientPrescriptionList,
        PrescriptionList, UpdatePrescriptionRequest,
    },
    entity::{
        doctors::Entity as Doctors,
        patients::Entity as Patients,
        prescriptions::{
            ActiveModel as PrescriptionActive, Column as RxCol, Entity as Prescriptions,
            Model as PrescriptionModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Prescription, Role},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Issue a prescription. The issuing doctor comes from the token and owns
/// the record from then on. No uniqueness constraint exists across the
/// non-key fields, so repeated issuance creates independent records.
pub async fn create(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePrescriptionRequest,
) -> AppResult<ApiResponse<Prescription>> {
    ensure_role(user, Role::Doctor)?;

    if payload.medication.trim().is_empty() || payload.dosage.trim().is_empty() {
        return Err(AppError::BadRequest(
            "medication and dosage are required".into(),
        ));
    }

    let patient = Patients::find_by_id(payload.patient_id)
        .one(&state.orm)
        .await?;
    if patient.is_none() {
        return Err(AppError::NotFound);
    }

    let prescription = PrescriptionActive {
        id: Set(Uuid::new_v4()),
        patient_id: Set(payload.patient_id),
        doctor_id: Set(user.user_id),
        medication: Set(payload.medication),
        dosage: Set(payload.dosage),
        frequency: Set(payload.frequency),
        valid_until: Set(payload.valid_until),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "prescription_create",
        Some("prescriptions"),
        Some(serde_json::json!({
            "prescription_id": prescription.id,
            "patient_id": prescription.patient_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Prescription created",
        prescription_from_entity(prescription),
        Some(Meta::empty()),
    ))
}

/// Prescriptions issued by the acting doctor, optionally for one patient.
pub async fn list_for_doctor(
    state: &AppState,
    user: &AuthUser,
    patient_id: Option<Uuid>,
) -> AppResult<ApiResponse<PrescriptionList>> {
    ensure_role(user, Role::Doctor)?;

    let mut condition = Condition::all().add(RxCol::DoctorId.eq(user.user_id));
    if let Some(patient_id) = patient_id {
        condition = condition.add(RxCol::PatientId.eq(patient_id));
    }

    let items = Prescriptions::find()
        .filter(condition)
        .order_by_desc(RxCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(prescription_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Prescriptions",
        PrescriptionList { items },
        Some(Meta::empty()),
    ))
}

/// Only the issuing doctor may update; anyone else gets the same 404 a
/// missing record would produce.
pub async fn update(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePrescriptionRequest,
) -> AppResult<ApiResponse<Prescription>> {
    ensure_role(user, Role::Doctor)?;

    let existing = Prescriptions::find_by_id(id)
        .filter(RxCol::DoctorId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: PrescriptionActive = existing.into();
    if let Some(medication) = payload.medication {
        active.medication = Set(medication);
    }
    if let Some(dosage) = payload.dosage {
        active.dosage = Set(dosage);
    }
    if let Some(frequency) = payload.frequency {
        active.frequency = Set(frequency);
    }
    if let Some(valid_until) = payload.valid_until {
        active.valid_until = Set(valid_until);
    }
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "prescription_update",
        Some("prescriptions"),
        Some(serde_json::json!({ "prescription_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Prescription updated",
        prescription_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_role(user, Role::Doctor)?;

    let existing = Prescriptions::find_by_id(id)
        .filter(RxCol::DoctorId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let prescription_id = existing.id;
    existing.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "prescription_delete",
        Some("prescriptions"),
        Some(serde_json::json!({ "prescription_id": prescription_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Prescription deleted",
        serde_json::json!({ "id": prescription_id }),
        Some(Meta::empty()),
    ))
}

/// A patient's own prescriptions, with the issuing doctor resolved.
pub async fn list_for_patient(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PatientPrescriptionList>> {
    ensure_role(user, Role::Patient)?;

    let rows = Prescriptions::find()
        .filter(RxCol::PatientId.eq(user.user_id))
        .find_also_related(Doctors)
        .order_by_desc(RxCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(rx, doctor)| PatientPrescription {
            prescription: prescription_from_entity(rx),
            doctor_name: doctor.map(|d| d.name),
        })
        .collect();

    Ok(ApiResponse::success(
        "Prescriptions",
        PatientPrescriptionList { items },
        Some(Meta::empty()),
    ))
}

fn prescription_from_entity(model: PrescriptionModel) -> Prescription {
    Prescription {
        id: model.id,
        patient_id: model.patient_id,
        doctor_id: model.doctor_id,
        medication: model.medication,
        dosage: model.dosage,
        frequency: model.frequency,
        valid_until: model.valid_until,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
