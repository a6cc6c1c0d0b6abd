//! Side-attachments carried by an exchange: messages, tracking, reviews,
//! disputes, and the shipping address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExchangeError, UserId};

/// A single entry in an exchange's append-only communication log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMessage {
    /// The party who sent the message.
    pub sender: UserId,

    /// Message body.
    pub content: String,

    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}

impl ExchangeMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(sender: UserId, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Carrier metadata attached once the exchange ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    /// Carrier name (e.g. "AusPost").
    pub carrier: String,

    /// Carrier-assigned tracking number.
    pub tracking_number: String,

    /// When the shipment was handed to the carrier.
    pub shipped_at: DateTime<Utc>,

    /// Carrier's delivery estimate, when one was given.
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl TrackingInfo {
    /// Creates tracking info stamped with the current time.
    pub fn new(carrier: impl Into<String>, tracking_number: impl Into<String>) -> Self {
        Self {
            carrier: carrier.into(),
            tracking_number: tracking_number.into(),
            shipped_at: Utc::now(),
            estimated_delivery: None,
        }
    }

    /// Sets the carrier's delivery estimate.
    pub fn with_estimated_delivery(mut self, estimate: DateTime<Utc>) -> Self {
        self.estimated_delivery = Some(estimate);
        self
    }
}

/// A party's review of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// The reviewing party.
    pub author: UserId,

    /// Star rating, 1 through 5.
    pub rating: u8,

    /// Free-text comment.
    pub comment: String,

    /// Optional tags (e.g. "fast-shipper", "as-described").
    pub tags: Vec<String>,

    /// When the review was left.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Creates a review, validating the rating range.
    pub fn new(
        author: UserId,
        rating: u8,
        comment: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self, ExchangeError> {
        if !(1..=5).contains(&rating) {
            return Err(ExchangeError::InvalidRating { rating });
        }
        Ok(Self {
            author,
            rating,
            comment: comment.into(),
            tags,
            created_at: Utc::now(),
        })
    }
}

/// Reason codes for opening a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeReason {
    /// Item never arrived.
    ItemNotReceived,

    /// Item arrived but does not match the listing.
    ItemNotAsDescribed,

    /// Payment went wrong.
    PaymentIssue,

    /// Anything else; see the description.
    Other,
}

impl DisputeReason {
    /// Returns the reason code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeReason::ItemNotReceived => "ItemNotReceived",
            DisputeReason::ItemNotAsDescribed => "ItemNotAsDescribed",
            DisputeReason::PaymentIssue => "PaymentIssue",
            DisputeReason::Other => "Other",
        }
    }
}

impl std::fmt::Display for DisputeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dispute opened on an exchange.
///
/// Recording a dispute is where this engine stops; adjudication is
/// handled externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// The party who opened the dispute.
    pub opener: UserId,

    /// Coded reason.
    pub reason: DisputeReason,

    /// Free-text description of the problem.
    pub description: String,

    /// When the dispute was opened.
    pub opened_at: DateTime<Utc>,
}

impl Dispute {
    /// Creates a dispute stamped with the current time.
    pub fn new(opener: UserId, reason: DisputeReason, description: impl Into<String>) -> Self {
        Self {
            opener,
            reason,
            description: description.into(),
            opened_at: Utc::now(),
        }
    }
}

/// Shipping destination for the exchanged garment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Name of the person receiving the shipment.
    pub recipient_name: String,

    /// Street address.
    pub line1: String,

    /// Apartment, unit, etc.
    pub line2: Option<String>,

    /// City or locality.
    pub city: String,

    /// Postal or ZIP code.
    pub postal_code: String,

    /// Country name or code.
    pub country: String,
}

impl Address {
    /// Creates an address with no second line.
    pub fn new(
        recipient_name: impl Into<String>,
        line1: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            line1: line1.into(),
            line2: None,
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }
}
