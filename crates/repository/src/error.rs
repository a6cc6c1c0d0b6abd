//! Repository error types.

use common::ExchangeId;
use domain::{ExchangeError, GarmentId, UserId};
use thiserror::Error;

/// Errors that can occur at the storage boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No exchange with the given ID exists.
    #[error("Exchange not found: {0}")]
    ExchangeNotFound(ExchangeId),

    /// No garment with the given ID exists.
    #[error("Garment not found: {0}")]
    GarmentNotFound(GarmentId),

    /// No user with the given ID exists.
    ///
    /// Produced by account-referencing implementations; the in-memory
    /// stores index only garments and exchanges.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The one-active-exchange-per-garment invariant would be violated.
    #[error("Garment {0} already has an active exchange")]
    ActiveExchangeExists(GarmentId),

    /// The requested mutation was rejected by the aggregate.
    #[error("Domain error: {0}")]
    Domain(#[from] ExchangeError),
}

/// Convenience type alias for repository results.
pub type Result<T> = std::result::Result<T, RepositoryError>;
