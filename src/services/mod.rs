//! Business logic services

pub mod audit;
pub mod auth;
pub mod expense;
pub mod export;
pub mod revenue;

pub use audit::{spawn_audit_writer, AuditRecorder};
pub use expense::{ExpenseImportOutcome, ExpenseService};
pub use export::ExportFormat;
pub use revenue::RevenueService;
