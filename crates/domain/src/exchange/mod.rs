//! Exchange aggregate and related types.

mod aggregate;
mod attachments;
mod next_action;
mod offer;
mod stage;
mod status;
mod value_objects;

pub use aggregate::Exchange;
pub use attachments::{Address, Dispute, DisputeReason, ExchangeMessage, Review, TrackingInfo};
pub use next_action::{NextAction, NextActionType};
pub use offer::{COUNTER_OFFER_REASON, Offer, OfferId, OfferStatus};
pub use stage::ExchangeStage;
pub use status::ExchangeStatus;
pub use value_objects::{Currency, ExchangeKind, GarmentId, Money, UserId};

use thiserror::Error;

/// Errors that can occur during exchange operations.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Exchange status does not permit the requested action.
    #[error("Invalid status transition: cannot {action} from {current} status")]
    InvalidStatusTransition {
        current: ExchangeStatus,
        action: &'static str,
    },

    /// Exchange stage does not permit the requested action.
    #[error("Invalid stage transition: cannot {action} from {current} stage")]
    InvalidStageTransition {
        current: ExchangeStage,
        action: &'static str,
    },

    /// Stage writes must move forward through the lifecycle.
    #[error("Stage must advance: {requested} does not follow {current}")]
    StageOutOfOrder {
        current: ExchangeStage,
        requested: ExchangeStage,
    },

    /// An open offer already exists on this exchange.
    #[error("An open offer already exists on this exchange")]
    OpenOfferExists,

    /// No offer with the given ID exists on this exchange.
    #[error("Offer not found: {offer_id}")]
    OfferNotFound { offer_id: OfferId },

    /// The referenced offer has already been accepted or declined.
    #[error("Offer is no longer open: {offer_id}")]
    OfferClosed { offer_id: OfferId },

    /// Tracking info can only be attached once.
    #[error("Tracking info is already attached")]
    TrackingAlreadyAttached,

    /// Review ratings are limited to 1 through 5.
    #[error("Invalid rating: {rating} (must be 1-5)")]
    InvalidRating { rating: u8 },

    /// Each party may review at most once.
    #[error("Party {author} has already reviewed this exchange")]
    DuplicateReview { author: UserId },

    /// A dispute is already open on this exchange.
    #[error("A dispute is already open on this exchange")]
    DisputeAlreadyOpen,
}
