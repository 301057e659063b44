use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::appointments::{
        AppointmentList, AvailableSlots, PatientAppointment, PatientAppointmentList,
        PatientRoster, PatientWithVisits, ScheduleAppointmentRequest,
    },
    entity::{
        appointments::{
            ActiveModel as AppointmentActive, Column as ApptCol, Entity as Appointments,
            Model as AppointmentModel,
        },
        doctors::Entity as Doctors,
        patients::{Column as PatientCol, Entity as Patients},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Appointment, AppointmentStatus, Patient, Role},
    response::{ApiResponse, Meta},
    routes::params::{AppointmentListQuery, SlotQuery},
    services::auth_service::patient_from_entity,
    state::AppState,
};

/// The clinic's fixed bookable slots, in canonical order.
pub const CANONICAL_SLOTS: [&str; 8] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "02:00 PM", "03:00 PM", "04:00 PM",
    "05:00 PM",
];

/// Canonical list minus booked times, keeping canonical order.
fn free_slots(booked: &[String]) -> Vec<String> {
    CANONICAL_SLOTS
        .iter()
        .filter(|slot| !booked.iter().any(|b| b == *slot))
        .map(|s| s.to_string())
        .collect()
}

/// `dates` must be sorted ascending. The last date before `today` is the
/// last visit; the first date at or after `today` is the next appointment.
/// Ties at the same date resolve to input order because the scan is stable.
fn derive_visits(dates: &[NaiveDate], today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let last_visit = dates.iter().filter(|d| **d < today).next_back().copied();
    let next_appointment = dates.iter().find(|d| **d >= today).copied();
    (last_visit, next_appointment)
}

fn parse_status(raw: &str) -> AppResult<AppointmentStatus> {
    AppointmentStatus::from_str(raw)
        .map_err(|_| AppError::BadRequest(format!("invalid appointment status: {raw}")))
}

/// Doctor-initiated scheduling. The acting doctor comes from the token, the
/// patient from the request body.
pub async fn schedule(
    state: &AppState,
    user: &AuthUser,
    payload: ScheduleAppointmentRequest,
) -> AppResult<ApiResponse<Appointment>> {
    ensure_role(user, Role::Doctor)?;

    if !CANONICAL_SLOTS.contains(&payload.time.as_str()) {
        return Err(AppError::BadRequest(format!(
            "invalid time slot: {}",
            payload.time
        )));
    }
    if payload.reason.trim().is_empty() {
        return Err(AppError::BadRequest("reason is required".into()));
    }

    let patient = Patients::find_by_id(payload.patient_id)
        .one(&state.orm)
        .await?;
    if patient.is_none() {
        return Err(AppError::NotFound);
    }

    // Cancelled appointments free their slot for rebooking.
    let taken = Appointments::find()
        .filter(ApptCol::DoctorId.eq(user.user_id))
        .filter(ApptCol::Date.eq(payload.date))
        .filter(ApptCol::Time.eq(payload.time.as_str()))
        .filter(ApptCol::Status.ne(AppointmentStatus::Cancelled.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("slot is already booked".into()));
    }

    let appointment = AppointmentActive {
        id: Set(Uuid::new_v4()),
        patient_id: Set(payload.patient_id),
        doctor_id: Set(user.user_id),
        date: Set(payload.date),
        time: Set(payload.time),
        reason: Set(payload.reason),
        status: Set(AppointmentStatus::Scheduled.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "appointment_schedule",
        Some("appointments"),
        Some(serde_json::json!({
            "appointment_id": appointment.id,
            "patient_id": appointment.patient_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Appointment scheduled",
        appointment_from_entity(appointment),
        Some(Meta::empty()),
    ))
}

/// A doctor's own appointments, optionally narrowed by date and status.
pub async fn list_for_doctor(
    state: &AppState,
    user: &AuthUser,
    query: AppointmentListQuery,
) -> AppResult<ApiResponse<AppointmentList>> {
    ensure_role(user, Role::Doctor)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(ApptCol::DoctorId.eq(user.user_id));
    if let Some(date) = query.date {
        condition = condition.add(ApptCol::Date.eq(date));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        parse_status(status)?;
        condition = condition.add(ApptCol::Status.eq(status.clone()));
    }

    let finder = Appointments::find()
        .filter(condition)
        .order_by_asc(ApptCol::Date)
        .order_by_asc(ApptCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(appointment_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Appointments",
        AppointmentList { items },
        Some(meta),
    ))
}

/// Status transition, scoped to the acting doctor. An appointment that does
/// not exist and one that belongs to another doctor are the same answer, so
/// a foreign id reveals nothing. Appointments are never hard-deleted.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    raw_status: &str,
) -> AppResult<ApiResponse<Appointment>> {
    ensure_role(user, Role::Doctor)?;
    let status = parse_status(raw_status)?;

    let existing = Appointments::find_by_id(id)
        .filter(ApptCol::DoctorId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: AppointmentActive = existing.into();
    active.status = Set(status.as_str().to_string());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        state,
        Some(user.user_id),
        Some(user.role),
        "appointment_status_update",
        Some("appointments"),
        Some(serde_json::json!({ "appointment_id": updated.id, "status": updated.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Appointment updated",
        appointment_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Free slots for the acting doctor on a given date.
pub async fn available_slots(
    state: &AppState,
    user: &AuthUser,
    query: SlotQuery,
) -> AppResult<ApiResponse<AvailableSlots>> {
    ensure_role(user, Role::Doctor)?;

    let booked: Vec<String> = Appointments::find()
        .filter(ApptCol::DoctorId.eq(user.user_id))
        .filter(ApptCol::Date.eq(query.date))
        .filter(ApptCol::Status.ne(AppointmentStatus::Cancelled.as_str()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|a| a.time)
        .collect();

    let data = AvailableSlots {
        date: query.date,
        slots: free_slots(&booked),
    };
    Ok(ApiResponse::success("Available slots", data, Some(Meta::empty())))
}

/// Every patient with at least one appointment with the acting doctor,
/// annotated with their last visit and next appointment.
pub async fn patients_with_appointments(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PatientRoster>> {
    ensure_role(user, Role::Doctor)?;

    let appointments = Appointments::find()
        .filter(ApptCol::DoctorId.eq(user.user_id))
        .order_by_asc(ApptCol::Date)
        .order_by_asc(ApptCol::CreatedAt)
        .all(&state.orm)
        .await?;

    // Group by patient, preserving first-appearance order.
    let mut order: Vec<Uuid> = Vec::new();
    let mut per_patient: HashMap<Uuid, Vec<NaiveDate>> = HashMap::new();
    for appt in &appointments {
        per_patient
            .entry(appt.patient_id)
            .or_insert_with(|| {
                order.push(appt.patient_id);
                Vec::new()
            })
            .push(appt.date);
    }

    let patients = Patients::find()
        .filter(PatientCol::Id.is_in(order.clone()))
        .all(&state.orm)
        .await?;
    let mut by_id: HashMap<Uuid, Patient> = patients
        .into_iter()
        .map(|p| (p.id, patient_from_entity(p)))
        .collect();

    let today = Utc::now().date_naive();
    let mut items = Vec::with_capacity(order.len());
    for patient_id in order {
        // A dangling patient reference is skipped rather than failing the
        // whole roster.
        let Some(patient) = by_id.remove(&patient_id) else {
            continue;
        };
        let (last_visit, next_appointment) = derive_visits(&per_patient[&patient_id], today);
        items.push(PatientWithVisits {
            patient,
            last_visit,
            next_appointment,
        });
    }

    Ok(ApiResponse::success(
        "Patients",
        PatientRoster { items },
        Some(Meta::empty()),
    ))
}

/// A patient's own appointments, with the doctor resolved by reference.
pub async fn list_for_patient(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PatientAppointmentList>> {
    ensure_role(user, Role::Patient)?;

    let rows = Appointments::find()
        .filter(ApptCol::PatientId.eq(user.user_id))
        .find_also_related(Doctors)
        .order_by_desc(ApptCol::Date)
        .order_by_desc(ApptCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(appt, doctor)| PatientAppointment {
            appointment: appointment_from_entity(appt),
            doctor_name: doctor.map(|d| d.name),
        })
        .collect();

    Ok(ApiResponse::success(
        "Appointments",
        PatientAppointmentList { items },
        Some(Meta::empty()),
    ))
}

fn appointment_from_entity(model: AppointmentModel) -> Appointment {
    Appointment {
        id: model.id,
        patient_id: model.patient_id,
        doctor_id: model.doctor_id,
        date: model.date,
        time: model.time,
        reason: model.reason,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    #[test]
    fn no_bookings_returns_all_slots_in_canonical_order() {
        let slots = free_slots(&[]);
        assert_eq!(slots, CANONICAL_SLOTS.to_vec());
    }

    #[test]
    fn fully_booked_day_has_no_free_slots() {
        let booked: Vec<String> = CANONICAL_SLOTS.iter().map(|s| s.to_string()).collect();
        assert!(free_slots(&booked).is_empty());
    }

    #[test]
    fn partial_bookings_keep_canonical_order() {
        let booked = vec!["10:00 AM".to_string(), "04:00 PM".to_string()];
        let slots = free_slots(&booked);
        assert_eq!(
            slots,
            vec![
                "09:00 AM", "11:00 AM", "12:00 PM", "02:00 PM", "03:00 PM", "05:00 PM"
            ]
        );
    }

    #[test]
    fn unknown_booked_labels_are_ignored() {
        let booked = vec!["01:30 PM".to_string()];
        assert_eq!(free_slots(&booked).len(), CANONICAL_SLOTS.len());
    }

    #[test]
    fn visits_split_around_today() {
        let dates = [
            date("2026-08-01"),
            date("2026-08-10"),
            date("2026-09-01"),
            date("2026-09-15"),
        ];
        let (last, next) = derive_visits(&dates, date("2026-08-29"));
        assert_eq!(last, Some(date("2026-08-10")));
        assert_eq!(next, Some(date("2026-09-01")));
    }

    #[test]
    fn today_counts_as_next_appointment_not_last_visit() {
        let dates = [date("2026-08-29")];
        let (last, next) = derive_visits(&dates, date("2026-08-29"));
        assert_eq!(last, None);
        assert_eq!(next, Some(date("2026-08-29")));
    }

    #[test]
    fn past_only_history_has_no_next_appointment() {
        let dates = [date("2026-01-05"), date("2026-02-06")];
        let (last, next) = derive_visits(&dates, date("2026-08-29"));
        assert_eq!(last, Some(date("2026-02-06")));
        assert_eq!(next, None);
    }

    #[test]
    fn future_only_history_has_no_last_visit() {
        let dates = [date("2026-09-05"), date("2026-10-06")];
        let (last, next) = derive_visits(&dates, date("2026-08-29"));
        assert_eq!(last, None);
        assert_eq!(next, Some(date("2026-09-05")));
    }

    #[test]
    fn empty_history_yields_nothing() {
        let (last, next) = derive_visits(&[], date("2026-08-29"));
        assert_eq!(last, None);
        assert_eq!(next, None);
    }

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert!(parse_status("scheduled").is_ok());
        assert!(parse_status("completed").is_ok());
        assert!(parse_status("cancelled").is_ok());
        assert!(parse_status("done").is_err());
        assert!(parse_status("SCHEDULED").is_err());
    }
}
