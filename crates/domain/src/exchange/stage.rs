//! Exchange stage state machine.

use serde::{Deserialize, Serialize};

/// Fine-grained lifecycle position of an exchange.
///
/// Stages only move forward:
/// ```text
/// Inquiry ──► Negotiating ──► Accepted ──► PaymentPending ──► PaymentReceived
///     ──► Preparing ──► Shipped ──► InTransit ──► Delivered
///     ──► ReviewPending ──► Completed
/// ```
///
/// Cancellation and decline are only reachable before `PaymentReceived`;
/// once payment is in flight, reversal goes through dispute. `Preparing`
/// and `InTransit` are seller/carrier-side refinements written at the
/// persistence boundary; every engine action accepts either stage of the
/// pair it follows.
///
/// Variant order is the lifecycle order, so the derived `Ord` gives the
/// monotonic-advance comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ExchangeStage {
    /// Initial interest expressed, awaiting a response.
    #[default]
    Inquiry,

    /// Offers and counter-offers are being traded.
    Negotiating,

    /// Terms agreed, exchange confirmed by the recipient.
    Accepted,

    /// Awaiting payment from the initiator.
    PaymentPending,

    /// Payment confirmed.
    PaymentReceived,

    /// Recipient is preparing the shipment.
    Preparing,

    /// Shipment handed to the carrier.
    Shipped,

    /// Shipment in transit.
    InTransit,

    /// Initiator confirmed receipt.
    Delivered,

    /// One party has reviewed, awaiting the other.
    ReviewPending,

    /// Both reviews in, exchange closed (terminal).
    Completed,
}

impl ExchangeStage {
    /// Returns true if offers can be made in this stage.
    pub fn can_negotiate(&self) -> bool {
        matches!(self, ExchangeStage::Inquiry | ExchangeStage::Negotiating)
    }

    /// Returns true if the exchange can be accepted in this stage.
    pub fn can_accept(&self) -> bool {
        matches!(self, ExchangeStage::Inquiry | ExchangeStage::Negotiating)
    }

    /// Returns true if payment can be confirmed in this stage.
    pub fn can_mark_paid(&self) -> bool {
        matches!(
            self,
            ExchangeStage::Accepted | ExchangeStage::PaymentPending
        )
    }

    /// Returns true if shipment can be confirmed in this stage.
    pub fn can_mark_shipped(&self) -> bool {
        matches!(
            self,
            ExchangeStage::PaymentReceived | ExchangeStage::Preparing
        )
    }

    /// Returns true if receipt can be confirmed in this stage.
    pub fn can_mark_received(&self) -> bool {
        matches!(self, ExchangeStage::Shipped | ExchangeStage::InTransit)
    }

    /// Returns true if reviews can be added in this stage.
    pub fn can_review(&self) -> bool {
        matches!(self, ExchangeStage::Delivered | ExchangeStage::ReviewPending)
    }

    /// Returns true if cancellation or decline is still offered.
    ///
    /// Once payment is received the engine no longer offers cancellation;
    /// reversal past that point goes through dispute.
    pub fn can_cancel(&self) -> bool {
        *self < ExchangeStage::PaymentReceived
    }

    /// Returns true if the shipping address can still be changed.
    pub fn can_update_address(&self) -> bool {
        *self < ExchangeStage::Shipped
    }

    /// Returns true if this is the terminal stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExchangeStage::Completed)
    }

    /// Returns the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStage::Inquiry => "Inquiry",
            ExchangeStage::Negotiating => "Negotiating",
            ExchangeStage::Accepted => "Accepted",
            ExchangeStage::PaymentPending => "PaymentPending",
            ExchangeStage::PaymentReceived => "PaymentReceived",
            ExchangeStage::Preparing => "Preparing",
            ExchangeStage::Shipped => "Shipped",
            ExchangeStage::InTransit => "InTransit",
            ExchangeStage::Delivered => "Delivered",
            ExchangeStage::ReviewPending => "ReviewPending",
            ExchangeStage::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
