//! Derived projection of who must act next on an exchange.

use serde::{Deserialize, Serialize};

use super::{ExchangeStage, UserId};

/// How the next actor is expected to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NextActionType {
    /// Respond to the inquiry or the open offer.
    Respond,

    /// Pay the agreed price.
    MakePayment,

    /// Ship the garment.
    ShipItem,

    /// Confirm the shipment arrived.
    ConfirmReceipt,

    /// Leave a review.
    LeaveReview,
}

impl NextActionType {
    /// Returns the action type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NextActionType::Respond => "Respond",
            NextActionType::MakePayment => "MakePayment",
            NextActionType::ShipItem => "ShipItem",
            NextActionType::ConfirmReceipt => "ConfirmReceipt",
            NextActionType::LeaveReview => "LeaveReview",
        }
    }
}

impl std::fmt::Display for NextActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The party who must act next and how.
///
/// This is a projection, never persisted: it is re-derived from the
/// exchange's current stage on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    /// The party expected to act.
    pub actor: UserId,

    /// What they are expected to do.
    pub action: NextActionType,

    /// Short human-readable description.
    pub description: String,
}

impl NextAction {
    /// Resolves the next required action from the current stage.
    ///
    /// Pure function of `(stage, initiator, recipient)`; `None` means the
    /// lifecycle needs nothing further. The first review is prompted from
    /// the initiator at `Delivered`; `ReviewPending` re-prompts the
    /// recipient so both parties review independently.
    pub fn resolve(
        stage: ExchangeStage,
        initiator: UserId,
        recipient: UserId,
    ) -> Option<NextAction> {
        let (actor, action, description) = match stage {
            ExchangeStage::Inquiry | ExchangeStage::Negotiating => (
                recipient,
                NextActionType::Respond,
                "Respond to the proposal",
            ),
            ExchangeStage::Accepted | ExchangeStage::PaymentPending => {
                (initiator, NextActionType::MakePayment, "Pay the agreed price")
            }
            ExchangeStage::PaymentReceived | ExchangeStage::Preparing => {
                (recipient, NextActionType::ShipItem, "Ship the garment")
            }
            ExchangeStage::Shipped | ExchangeStage::InTransit => (
                initiator,
                NextActionType::ConfirmReceipt,
                "Confirm the garment arrived",
            ),
            ExchangeStage::Delivered => {
                (initiator, NextActionType::LeaveReview, "Leave a review")
            }
            ExchangeStage::ReviewPending => {
                (recipient, NextActionType::LeaveReview, "Leave a review")
            }
            ExchangeStage::Completed => return None,
        };

        Some(NextAction {
            actor,
            action,
            description: description.to_string(),
        })
    }
}
