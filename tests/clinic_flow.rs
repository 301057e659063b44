use chrono::{Duration, Utc};
use clinic_api::{
    bootstrap,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        admin::AddDoctorRequest,
        appointments::ScheduleAppointmentRequest,
        auth::{LoginRequest, RegisterRequest},
        prescriptions::{CreatePrescriptionRequest, UpdatePrescriptionRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    routes::params::SlotQuery,
    services::{admin_service, appointment_service, auth_service, prescription_service},
    state::AppState,
    token::TokenService,
};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Statement};
use uuid::Uuid;

const TEST_SECRET: &str = "integration-test-secret";

// Both tests truncate the same tables, so they must not interleave.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

// Integration flow: admin adds a doctor, a patient registers, the doctor
// schedules an appointment, checks free slots, transitions status, and
// issues prescriptions; role and ownership boundaries are probed throughout.
#[tokio::test]
async fn clinic_end_to_end_flow() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;

    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    // An acting admin only needs a verified admin token, not a stored row.
    let acting_admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    };

    // Admin adds a doctor.
    let doctor = admin_service::add_doctor(
        &state,
        &acting_admin,
        AddDoctorRequest {
            name: "Dr. Mensah".into(),
            email: "mensah@clinic.test".into(),
            password: "doctor-pass".into(),
            specialization: "Cardiology".into(),
            phone: None,
        },
    )
    .await?
    .data
    .unwrap();

    // Duplicate doctor email is rejected before insert.
    let dup = admin_service::add_doctor(
        &state,
        &acting_admin,
        AddDoctorRequest {
            name: "Dr. Mensah".into(),
            email: "mensah@clinic.test".into(),
            password: "doctor-pass".into(),
            specialization: "Cardiology".into(),
            phone: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // Patient self-signup.
    let patient = auth_service::register_patient(
        &state,
        RegisterRequest {
            name: "Ama Owusu".into(),
            email: "ama@clinic.test".into(),
            password: "patient-pass".into(),
            phone: Some("+233200000000".into()),
            date_of_birth: None,
            gender: None,
            address: None,
        },
    )
    .await?
    .data
    .unwrap();

    // Doctor login round-trips through the token service.
    let login = auth_service::login(
        &state,
        LoginRequest {
            email: "mensah@clinic.test".into(),
            password: "doctor-pass".into(),
            role: Role::Doctor,
        },
    )
    .await?
    .data
    .unwrap();
    let (token_id, token_role) = state.tokens.verify(&login.token)?;
    assert_eq!(token_id, doctor.id);
    assert_eq!(token_role, Role::Doctor);

    // Wrong password, wrong role, and unknown email fail identically.
    let wrong_password = auth_service::login(
        &state,
        LoginRequest {
            email: "mensah@clinic.test".into(),
            password: "nope".into(),
            role: Role::Doctor,
        },
    )
    .await
    .unwrap_err();
    let wrong_role = auth_service::login(
        &state,
        LoginRequest {
            email: "mensah@clinic.test".into(),
            password: "doctor-pass".into(),
            role: Role::Patient,
        },
    )
    .await
    .unwrap_err();
    let unknown_email = auth_service::login(
        &state,
        LoginRequest {
            email: "ghost@clinic.test".into(),
            password: "doctor-pass".into(),
            role: Role::Doctor,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(wrong_password.to_string(), wrong_role.to_string());
    assert_eq!(wrong_role.to_string(), unknown_email.to_string());

    let acting_doctor = AuthUser {
        user_id: doctor.id,
        role: Role::Doctor,
    };

    // Schedule an appointment a week out.
    let date = (Utc::now() + Duration::days(7)).date_naive();
    let appointment = appointment_service::schedule(
        &state,
        &acting_doctor,
        ScheduleAppointmentRequest {
            patient_id: patient.id,
            date,
            time: "10:00 AM".into(),
            reason: "Follow-up".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(appointment.status, "scheduled");

    // The booked slot disappears from availability; order stays canonical.
    let slots = appointment_service::available_slots(
        &state,
        &acting_doctor,
        SlotQuery { date },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(slots.slots.len(), 7);
    assert_eq!(slots.slots.first().map(String::as_str), Some("09:00 AM"));
    assert!(!slots.slots.iter().any(|s| s == "10:00 AM"));

    // Double-booking the same slot is refused.
    let clash = appointment_service::schedule(
        &state,
        &acting_doctor,
        ScheduleAppointmentRequest {
            patient_id: patient.id,
            date,
            time: "10:00 AM".into(),
            reason: "Clash".into(),
        },
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    // Status transition is idempotent for a repeated valid status.
    let first = appointment_service::update_status(
        &state,
        &acting_doctor,
        appointment.id,
        "completed",
    )
    .await?
    .data
    .unwrap();
    let second = appointment_service::update_status(
        &state,
        &acting_doctor,
        appointment.id,
        "completed",
    )
    .await?
    .data
    .unwrap();
    assert_eq!(first.status, "completed");
    assert_eq!(second.status, "completed");

    // Invalid status values are rejected before any write.
    let bad_status = appointment_service::update_status(
        &state,
        &acting_doctor,
        appointment.id,
        "done",
    )
    .await;
    assert!(matches!(bad_status, Err(AppError::BadRequest(_))));

    // A different doctor patching this appointment gets a plain 404.
    let other_doctor = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Doctor,
    };
    let foreign = appointment_service::update_status(
        &state,
        &other_doctor,
        appointment.id,
        "cancelled",
    )
    .await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    // The roster lists the patient with a future next appointment.
    let roster = appointment_service::patients_with_appointments(&state, &acting_doctor)
        .await?
        .data
        .unwrap();
    let entry = roster
        .items
        .iter()
        .find(|p| p.patient.id == patient.id)
        .expect("patient on roster");
    assert_eq!(entry.next_appointment, Some(date));
    assert_eq!(entry.last_visit, None);

    // Two identical prescriptions both persist as independent records.
    let valid_until = (Utc::now() + Duration::days(30)).date_naive();
    let rx_request = || CreatePrescriptionRequest {
        patient_id: patient.id,
        medication: "Amoxicillin".into(),
        dosage: "500mg".into(),
        frequency: "3x daily".into(),
        valid_until,
    };
    let rx1 = prescription_service::create(&state, &acting_doctor, rx_request())
        .await?
        .data
        .unwrap();
    let _rx2 = prescription_service::create(&state, &acting_doctor, rx_request())
        .await?
        .data
        .unwrap();
    let listed = prescription_service::list_for_doctor(&state, &acting_doctor, Some(patient.id))
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 2);

    // Only the issuing doctor may touch a prescription.
    let foreign_update = prescription_service::update(
        &state,
        &other_doctor,
        rx1.id,
        UpdatePrescriptionRequest {
            medication: None,
            dosage: Some("250mg".into()),
            frequency: None,
            valid_until: None,
        },
    )
    .await;
    assert!(matches!(foreign_update, Err(AppError::NotFound)));

    let updated = prescription_service::update(
        &state,
        &acting_doctor,
        rx1.id,
        UpdatePrescriptionRequest {
            medication: None,
            dosage: Some("250mg".into()),
            frequency: None,
            valid_until: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.dosage, "250mg");

    prescription_service::delete(&state, &acting_doctor, rx1.id).await?;
    let after_delete =
        prescription_service::list_for_doctor(&state, &acting_doctor, Some(patient.id))
            .await?
            .data
            .unwrap();
    assert_eq!(after_delete.items.len(), 1);

    // A patient-role token may not reach admin actions.
    let acting_patient = AuthUser {
        user_id: patient.id,
        role: Role::Patient,
    };
    let forbidden = admin_service::add_doctor(
        &state,
        &acting_patient,
        AddDoctorRequest {
            name: "Dr. Nope".into(),
            email: "nope@clinic.test".into(),
            password: "x".into(),
            specialization: "None".into(),
            phone: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Global counts reflect the records created above.
    let stats = admin_service::stats(&state, &acting_admin)
        .await?
        .data
        .unwrap();
    assert_eq!(stats.total_doctors, 1);
    assert_eq!(stats.total_patients, 1);
    assert_eq!(stats.total_appointments, 1);
    assert_eq!(stats.total_prescriptions, 1);

    Ok(())
}

#[tokio::test]
async fn seed_admin_bootstrap_and_login() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;

    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let config = AppConfig {
        database_url: database_url.clone(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: TEST_SECRET.into(),
        seed_admin_email: "admin@clinic.local".into(),
        seed_admin_password: "admin123".into(),
    };

    // Seeding twice is a no-op the second time.
    bootstrap::ensure_seed_admin(&state.orm, &config).await?;
    bootstrap::ensure_seed_admin(&state.orm, &config).await?;
    let admins = clinic_api::entity::Admins::find().count(&state.orm).await?;
    assert_eq!(admins, 1);

    // The seed password was hashed, so a normal login works.
    let login = auth_service::login(
        &state,
        LoginRequest {
            email: "admin@clinic.local".into(),
            password: "admin123".into(),
            role: Role::Admin,
        },
    )
    .await?
    .data
    .unwrap();
    let (_, role) = state.tokens.verify(&login.token)?;
    assert_eq!(role, Role::Admin);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE prescriptions, appointments, audit_logs, patients, doctors, admins RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        orm,
        tokens: TokenService::new(TEST_SECRET),
    })
}
