use thiserror::Error;

use crate::types::BusinessId;

/// Failures surfaced by the access core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Network or backend error while fetching identity or profile
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Guard outcome for a business the user may not administer
    #[error("Access to business {0} denied")]
    AuthorizationDenied(BusinessId),

    /// Caller tried to activate a business outside the membership list
    #[error("Business {0} is not one of the user's memberships")]
    InvalidSelection(BusinessId),
}

impl AccessError {
    pub fn transport(message: impl Into<String>) -> Self {
        AccessError::TransportFailure(message.into())
    }
}
