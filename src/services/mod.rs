pub mod admin_service;
pub mod appointment_service;
pub mod auth_service;
pub mod prescription_service;
pub mod profile_service;
