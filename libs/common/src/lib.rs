//! Shared infrastructure for the ledger services
//!
//! Connection pooling for the durable ledger database and the error types
//! shared by every service that talks to it.

pub mod database;
pub mod error;

pub use database::{DatabaseConfig, health_check, init_pool};
pub use error::{DatabaseError, DatabaseResult};
