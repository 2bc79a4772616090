//! Caller role checks for administrative report views.
//!
//! Token validation happens upstream; by the time the engine runs, the
//! caller's role is already established. This module only enforces which
//! views that role may read.

use thiserror::Error;

/// Role of the caller, as established by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// Administrator: may read every view.
    Admin,
    /// Field data collector: may only read per-record insights.
    Collector,
}

/// Access violations, distinct from not-found conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("the {view} view requires the admin role")]
    Forbidden { view: String },
}

/// Guard an administrative view behind the admin role.
pub fn require_admin(role: Role, view: &str) -> Result<(), AccessError> {
    match role {
        Role::Admin => Ok(()),
        Role::Collector => Err(AccessError::Forbidden {
            view: view.to_string(),
        }),
    }
}
