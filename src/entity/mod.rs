pub mod admins;
pub mod appointments;
pub mod audit_logs;
pub mod doctors;
pub mod patients;
pub mod prescriptions;

pub use admins::Entity as Admins;
pub use appointments::Entity as Appointments;
pub use audit_logs::Entity as AuditLogs;
pub use doctors::Entity as Doctors;
pub use patients::Entity as Patients;
pub use prescriptions::Entity as Prescriptions;
