//! # Ownership Guard
//!
//! Decides whether a caller may act on a fetched resource. Runs before
//! every update/delete and before a get-by-id response is disclosed.

use crate::error::{AppError, Result};

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
}

/// Exact, case-sensitive identifier match. Anything else is `Forbidden`.
pub fn authorize(resource_owner_id: &str, caller_id: &str) -> Access {
    if resource_owner_id == caller_id {
        Access::Allowed
    } else {
        Access::Forbidden
    }
}

/// Handler-side guard translating `Forbidden` into the domain error.
pub fn ensure_owner(resource: &str, resource_owner_id: &str, caller_id: &str) -> Result<()> {
    match authorize(resource_owner_id, caller_id) {
        Access::Allowed => Ok(()),
        Access::Forbidden => Err(AppError::Forbidden(format!(
            "caller does not own this {resource}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_iff_identifiers_equal() {
        assert_eq!(authorize("user-1", "user-1"), Access::Allowed);
        assert_eq!(authorize("user-1", "user-2"), Access::Forbidden);
        // Case-sensitive on purpose: identity-provider IDs are opaque.
        assert_eq!(authorize("User-1", "user-1"), Access::Forbidden);
        assert_eq!(authorize("", "user-1"), Access::Forbidden);
    }

    #[test]
    fn ensure_owner_surfaces_forbidden() {
        assert!(ensure_owner("outfit", "a", "a").is_ok());
        let err = ensure_owner("outfit", "a", "b").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
