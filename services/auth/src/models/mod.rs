//! Session-authentication models

pub mod identity;
pub mod session;

// Re-export for convenience
pub use identity::{Identity, LoginCredentials};
pub use session::{AuthenticatedSession, LoginOutcome, SessionEntry, SessionStats};
