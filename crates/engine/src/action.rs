//! The closed set of actions the orchestrator accepts.

use common::ExchangeId;
use domain::{Address, DisputeReason, GarmentId, Money, OfferId, TrackingInfo, UserId};
use serde::{Deserialize, Serialize};

/// One operation on an exchange, with its payload.
///
/// The orchestrator dispatches on this with one exhaustive match, so
/// adding an action is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExchangeAction {
    /// Open a purchase exchange on a listed garment.
    InitiatePurchase {
        garment_id: GarmentId,
        /// Proposed price; `None` means the list price.
        offered_price: Option<Money>,
        /// Optional opening message.
        message: Option<String>,
    },

    /// Open a trade exchange on a listed garment.
    InitiateTrade {
        garment_id: GarmentId,
        /// Garments offered in trade; each must be owned by the initiator.
        offered_garment_ids: Vec<GarmentId>,
        /// Optional cash component.
        offered_price: Option<Money>,
        /// Optional opening message.
        message: Option<String>,
    },

    /// Propose new terms within the negotiation.
    MakeOffer {
        exchange_id: ExchangeId,
        amount: Option<Money>,
        garment_ids: Vec<GarmentId>,
        message: Option<String>,
    },

    /// Accept the open offer, promoting its terms onto the exchange.
    AcceptOffer {
        exchange_id: ExchangeId,
        offer_id: OfferId,
    },

    /// Decline the open offer.
    DeclineOffer {
        exchange_id: ExchangeId,
        offer_id: OfferId,
        reason: Option<String>,
    },

    /// Decline the referenced offer and propose new terms in its place.
    CounterOffer {
        exchange_id: ExchangeId,
        offer_id: OfferId,
        amount: Option<Money>,
        garment_ids: Vec<GarmentId>,
        message: Option<String>,
    },

    /// Append a message to the communication log.
    SendMessage {
        exchange_id: ExchangeId,
        content: String,
    },

    /// Accept the exchange at its current terms.
    AcceptExchange { exchange_id: ExchangeId },

    /// Decline the exchange.
    DeclineExchange {
        exchange_id: ExchangeId,
        reason: Option<String>,
    },

    /// Cancel the exchange.
    CancelExchange {
        exchange_id: ExchangeId,
        reason: Option<String>,
    },

    /// Confirm payment of the agreed price.
    MarkPaid { exchange_id: ExchangeId },

    /// Confirm the garment shipped, optionally attaching tracking.
    MarkShipped {
        exchange_id: ExchangeId,
        tracking: Option<TrackingInfo>,
    },

    /// Confirm the garment arrived.
    MarkReceived { exchange_id: ExchangeId },

    /// Leave a review.
    AddReview {
        exchange_id: ExchangeId,
        rating: u8,
        comment: String,
        tags: Vec<String>,
    },

    /// Open a dispute.
    OpenDispute {
        exchange_id: ExchangeId,
        reason: DisputeReason,
        description: String,
    },

    /// Replace the shipping address.
    UpdateShippingAddress {
        exchange_id: ExchangeId,
        address: Address,
    },
}

impl ExchangeAction {
    /// Returns a stable name for the action, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeAction::InitiatePurchase { .. } => "initiate_purchase",
            ExchangeAction::InitiateTrade { .. } => "initiate_trade",
            ExchangeAction::MakeOffer { .. } => "make_offer",
            ExchangeAction::AcceptOffer { .. } => "accept_offer",
            ExchangeAction::DeclineOffer { .. } => "decline_offer",
            ExchangeAction::CounterOffer { .. } => "counter_offer",
            ExchangeAction::SendMessage { .. } => "send_message",
            ExchangeAction::AcceptExchange { .. } => "accept_exchange",
            ExchangeAction::DeclineExchange { .. } => "decline_exchange",
            ExchangeAction::CancelExchange { .. } => "cancel_exchange",
            ExchangeAction::MarkPaid { .. } => "mark_paid",
            ExchangeAction::MarkShipped { .. } => "mark_shipped",
            ExchangeAction::MarkReceived { .. } => "mark_received",
            ExchangeAction::AddReview { .. } => "add_review",
            ExchangeAction::OpenDispute { .. } => "open_dispute",
            ExchangeAction::UpdateShippingAddress { .. } => "update_shipping_address",
        }
    }
}

/// The request envelope the presentation layer sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeInput {
    /// The action to apply.
    pub action: ExchangeAction,

    /// The authenticated acting user.
    pub user_id: UserId,
}

impl ExchangeInput {
    /// Creates a new input envelope.
    pub fn new(action: ExchangeAction, user_id: UserId) -> Self {
        Self { action, user_id }
    }
}
