//! Coarse exchange status.

use serde::{Deserialize, Serialize};

/// The coarse state of an exchange.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Accepted ──┬──► Completed
///           │               │
///           ├──► Declined   ├──► Cancelled (before payment received)
///           ├──► Cancelled  └──► Disputed
///           └──► Disputed
/// ```
///
/// `Disputed` is terminal for this engine; resolution is handed to
/// external adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExchangeStatus {
    /// Proposed, awaiting the recipient's response.
    #[default]
    Pending,

    /// Terms agreed by both parties.
    Accepted,

    /// Declined by the recipient (terminal state).
    Declined,

    /// Cancelled by either party (terminal state).
    Cancelled,

    /// Both parties fulfilled their side (terminal state).
    Completed,

    /// A dispute is open, handed to external adjudication (terminal state).
    Disputed,
}

impl ExchangeStatus {
    /// Returns true if the exchange is still in play.
    pub fn is_active(&self) -> bool {
        matches!(self, ExchangeStatus::Pending | ExchangeStatus::Accepted)
    }

    /// Returns true if the exchange can be accepted or declined.
    pub fn can_respond(&self) -> bool {
        matches!(self, ExchangeStatus::Pending)
    }

    /// Returns true if the exchange can be cancelled.
    pub fn can_cancel(&self) -> bool {
        self.is_active()
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "Pending",
            ExchangeStatus::Accepted => "Accepted",
            ExchangeStatus::Declined => "Declined",
            ExchangeStatus::Cancelled => "Cancelled",
            ExchangeStatus::Completed => "Completed",
            ExchangeStatus::Disputed => "Disputed",
        }
    }
}

impl std::fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
