//! Engine error taxonomy.

use common::ExchangeId;
use domain::{ExchangeError, GarmentId, Money, UserId};
use repository::RepositoryError;
use thiserror::Error;

/// Errors returned by the orchestrator.
///
/// All failures are terminal and local: the engine never retries and
/// never suppresses — the caller decides what happens next.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Garment is not listed, or its listing type does not permit the
    /// requested exchange kind.
    #[error("Garment not available: {reason}")]
    GarmentNotAvailable { reason: String },

    /// The garment already has an active exchange.
    #[error("Garment already has an active exchange")]
    GarmentAlreadyInExchange,

    /// The initiator owns the garment they are trying to exchange for.
    #[error("Cannot open an exchange on your own garment")]
    CannotExchangeWithSelf,

    /// The actor does not own an asset they claim to offer, or attempted
    /// an action reserved for the other party.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Proposed price falls below the pricing-guidance floor.
    ///
    /// Carries the computed minimum for client display.
    #[error("Offer is below the suggested minimum of {minimum}")]
    OfferTooLow { minimum: Money },

    /// The exchange's current state does not permit the action.
    #[error("Invalid exchange state: {0}")]
    InvalidExchangeState(#[from] ExchangeError),

    /// No exchange with the given ID exists.
    #[error("Exchange not found: {0}")]
    ExchangeNotFound(ExchangeId),

    /// No garment with the given ID exists.
    #[error("Garment not found: {0}")]
    GarmentNotFound(GarmentId),

    /// No user with the given ID exists.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Payment cannot be confirmed at this point in the lifecycle.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// A shipping precondition is not met.
    #[error("Shipping requirement not met: {0}")]
    ShippingRequired(String),

    /// A review precondition is not met.
    #[error("Review not allowed: {0}")]
    ReviewNotAllowed(String),

    /// A dispute cannot be opened at this point in the lifecycle.
    #[error("Dispute not allowed: {0}")]
    DisputeNotAllowed(String),

    /// The pricing guidance collaborator failed.
    #[error("Pricing service error: {0}")]
    PricingService(String),
}

impl From<RepositoryError> for EngineError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::ExchangeNotFound(id) => EngineError::ExchangeNotFound(id),
            RepositoryError::GarmentNotFound(id) => EngineError::GarmentNotFound(id),
            RepositoryError::UserNotFound(id) => EngineError::UserNotFound(id),
            RepositoryError::ActiveExchangeExists(_) => EngineError::GarmentAlreadyInExchange,
            RepositoryError::Domain(e) => EngineError::InvalidExchangeState(e),
        }
    }
}

/// Convenience type alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
