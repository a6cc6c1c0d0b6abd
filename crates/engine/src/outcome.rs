//! The structured result returned to the caller after every action.

use domain::{Exchange, ExchangeStatus, Garment, NextAction, UserId};
use serde::{Deserialize, Serialize};

/// The new state of an exchange after an action, with the derived
/// next-action projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeOutcome {
    /// The exchange after the transition.
    pub exchange: Exchange,

    /// The garment, when the action touched its listing state.
    pub garment: Option<Garment>,

    /// The acting user's counterparty.
    pub other_party: Option<UserId>,

    /// Coarse status after the transition.
    pub status: ExchangeStatus,

    /// Who must act next and how; None when the lifecycle needs nothing
    /// further.
    pub next_action: Option<NextAction>,

    /// Optional human-readable note about what happened.
    pub message: Option<String>,
}

impl ExchangeOutcome {
    /// Builds an outcome from the post-transition exchange.
    pub fn from_exchange(exchange: Exchange, actor: UserId) -> Self {
        let other_party = exchange.other_party(actor);
        let status = exchange.status();
        let next_action = exchange.next_action();
        Self {
            exchange,
            garment: None,
            other_party,
            status,
            next_action,
            message: None,
        }
    }

    /// Attaches the garment to the outcome.
    pub fn with_garment(mut self, garment: Garment) -> Self {
        self.garment = Some(garment);
        self
    }

    /// Attaches a note to the outcome.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
