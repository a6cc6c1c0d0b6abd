//! Offers and the negotiation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ExchangeError, GarmentId, Money, UserId};

/// Decline reason recorded when an offer is superseded by a counter-offer.
pub const COUNTER_OFFER_REASON: &str = "counter offer made";

/// Unique identifier for an offer within an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(Uuid);

impl OfferId {
    /// Creates a new random offer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an offer ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OfferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state of an offer within a negotiation.
///
/// At most one offer per exchange is `Open` at a time; acceptance or
/// decline closes it before a new one may be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OfferStatus {
    /// Awaiting a response from the other party.
    #[default]
    Open,

    /// Accepted; its terms were promoted onto the exchange.
    Accepted,

    /// Declined, possibly superseded by a counter-offer.
    Declined,
}

impl OfferStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Open => "Open",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Declined => "Declined",
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed set of terms within a negotiation.
///
/// Terms are immutable once the offer is created; decline and counter
/// append new records rather than rewriting this one, preserving the full
/// negotiation history for audit and dispute evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    id: OfferId,
    proposer: UserId,
    amount: Option<Money>,
    garment_ids: Vec<GarmentId>,
    message: Option<String>,
    status: OfferStatus,
    decline_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl Offer {
    /// Creates a new open offer.
    ///
    /// Trades may carry no cash component, so `amount` is optional.
    pub fn new(
        proposer: UserId,
        amount: Option<Money>,
        garment_ids: Vec<GarmentId>,
        message: Option<String>,
    ) -> Self {
        Self {
            id: OfferId::new(),
            proposer,
            amount,
            garment_ids,
            message,
            status: OfferStatus::Open,
            decline_reason: None,
            created_at: Utc::now(),
        }
    }

    /// Returns the offer ID.
    pub fn id(&self) -> OfferId {
        self.id
    }

    /// Returns the proposing party.
    pub fn proposer(&self) -> UserId {
        self.proposer
    }

    /// Returns the proposed cash amount, if any.
    pub fn amount(&self) -> Option<Money> {
        self.amount
    }

    /// Returns the garments offered in trade.
    pub fn garment_ids(&self) -> &[GarmentId] {
        &self.garment_ids
    }

    /// Returns the free-text message attached to the offer.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the current offer status.
    pub fn status(&self) -> OfferStatus {
        self.status
    }

    /// Returns the recorded decline reason, if any.
    pub fn decline_reason(&self) -> Option<&str> {
        self.decline_reason.as_deref()
    }

    /// Returns when the offer was made.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the offer is awaiting a response.
    pub fn is_open(&self) -> bool {
        self.status == OfferStatus::Open
    }

    /// Closes the offer as accepted.
    pub(crate) fn accept(&mut self) -> Result<(), ExchangeError> {
        if !self.is_open() {
            return Err(ExchangeError::OfferClosed { offer_id: self.id });
        }
        self.status = OfferStatus::Accepted;
        Ok(())
    }

    /// Closes the offer as declined, recording the reason for audit.
    pub(crate) fn decline(&mut self, reason: Option<String>) -> Result<(), ExchangeError> {
        if !self.is_open() {
            return Err(ExchangeError::OfferClosed { offer_id: self.id });
        }
        self.status = OfferStatus::Declined;
        self.decline_reason = reason;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_offer() -> Offer {
        Offer::new(
            UserId::new(),
            Some(Money::from_cents(8000)),
            vec![],
            Some("Would you take $80?".to_string()),
        )
    }

    #[test]
    fn test_new_offer_is_open() {
        let offer = open_offer();
        assert!(offer.is_open());
        assert_eq!(offer.status(), OfferStatus::Open);
        assert_eq!(offer.amount(), Some(Money::from_cents(8000)));
        assert!(offer.decline_reason().is_none());
    }

    #[test]
    fn test_accept_closes_offer() {
        let mut offer = open_offer();
        offer.accept().unwrap();
        assert_eq!(offer.status(), OfferStatus::Accepted);
        assert!(!offer.is_open());
    }

    #[test]
    fn test_decline_records_reason() {
        let mut offer = open_offer();
        offer.decline(Some(COUNTER_OFFER_REASON.to_string())).unwrap();
        assert_eq!(offer.status(), OfferStatus::Declined);
        assert_eq!(offer.decline_reason(), Some(COUNTER_OFFER_REASON));
    }

    #[test]
    fn test_closed_offer_cannot_be_reclosed() {
        let mut offer = open_offer();
        offer.decline(None).unwrap();

        let result = offer.accept();
        assert!(matches!(result, Err(ExchangeError::OfferClosed { .. })));

        let result = offer.decline(Some("again".to_string()));
        assert!(matches!(result, Err(ExchangeError::OfferClosed { .. })));
    }

    #[test]
    fn test_trade_offer_without_cash() {
        let garments = vec![GarmentId::new(), GarmentId::new()];
        let offer = Offer::new(UserId::new(), None, garments.clone(), None);
        assert_eq!(offer.amount(), None);
        assert_eq!(offer.garment_ids(), garments.as_slice());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let offer = open_offer();
        let json = serde_json::to_string(&offer).unwrap();
        let deserialized: Offer = serde_json::from_str(&json).unwrap();
        assert_eq!(offer, deserialized);
    }
}
