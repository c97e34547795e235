//! Common test utilities and helpers
//!
//! Shared test infrastructure: fixture files, test database setup and
//! an in-process API test client.

pub mod test_app;

pub use fixtures::*;
pub use test_app::*;
