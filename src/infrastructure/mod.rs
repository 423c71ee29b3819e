pub mod cart_repo;
pub mod catalog_repo;
pub mod clock;
pub mod coupon_repo;
pub mod inbox_repo;
pub mod jwt;
pub mod models;
pub mod notifiers;
pub mod order_repo;
pub mod outbox_repo;
pub mod password_hasher;
pub mod payment_gateways;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::DatabaseErrorKind;

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::InvalidInput(format!("Duplicate value: {}", info.message()))
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DomainError::InvalidInput(format!("Unknown reference: {}", info.message()))
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
