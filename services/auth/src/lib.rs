//! Session-based authentication for the ledger web application
//!
//! Credentials are checked against the durable identity store, successful
//! logins open a session in an in-memory [`SessionStore`], and every
//! protected request is authorized through the [`Authenticator`]. Sessions
//! slide forward while in use and are swept once abandoned.

pub mod authenticator;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod settings;
pub mod state;
pub mod sweeper;
pub mod token;

pub use authenticator::{Authenticator, PermissionRule, SessionPolicy};
pub use credentials::CredentialVerifier;
pub use error::{AuthError, AuthResult};
pub use session::SessionStore;
pub use state::AppState;
pub use sweeper::SessionSweeper;
