//! Garment listing entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exchange::{GarmentId, Money, UserId};

/// How a garment may be exchanged, fixed by its owner at listing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingType {
    /// Sale only.
    Sale,

    /// Trade only.
    Trade,

    /// Owner accepts either.
    SaleOrTrade,
}

impl ListingType {
    /// Returns true if the garment can be purchased.
    pub fn permits_sale(&self) -> bool {
        matches!(self, ListingType::Sale | ListingType::SaleOrTrade)
    }

    /// Returns true if the garment can be traded for.
    pub fn permits_trade(&self) -> bool {
        matches!(self, ListingType::Trade | ListingType::SaleOrTrade)
    }

    /// Returns the listing type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "Sale",
            ListingType::Trade => "Trade",
            ListingType::SaleOrTrade => "SaleOrTrade",
        }
    }
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The visibility/availability state of a listing.
///
/// Only `Listed` garments can enter a new exchange; creating one reserves
/// the garment, decline/cancel re-lists it, completion marks it sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GarmentStatus {
    /// Visible and available.
    #[default]
    Listed,

    /// Held by an active exchange.
    Reserved,

    /// Exchange completed; no longer available.
    Sold,

    /// Hidden by the owner.
    Hidden,
}

impl GarmentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentStatus::Listed => "Listed",
            GarmentStatus::Reserved => "Reserved",
            GarmentStatus::Sold => "Sold",
            GarmentStatus::Hidden => "Hidden",
        }
    }
}

impl std::fmt::Display for GarmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A listed garment eligible for sale or trade.
///
/// Owned by exactly one user at a time. The engine reads listings to
/// validate exchange creation; the catalog itself (stories, imagery,
/// style data) lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garment {
    /// Unique garment identifier.
    pub id: GarmentId,

    /// The owning user.
    pub owner_id: UserId,

    /// Listing title.
    pub title: String,

    /// How the owner is willing to exchange it.
    pub listing: ListingType,

    /// List price; trades may carry none.
    pub price: Option<Money>,

    /// Availability state.
    pub status: GarmentStatus,

    /// When the garment was listed.
    pub created_at: DateTime<Utc>,
}

impl Garment {
    /// Creates a new listed garment.
    pub fn new(
        owner_id: UserId,
        title: impl Into<String>,
        listing: ListingType,
        price: Option<Money>,
    ) -> Self {
        Self {
            id: GarmentId::new(),
            owner_id,
            title: title.into(),
            listing,
            price,
            status: GarmentStatus::Listed,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the garment is available for a new exchange.
    pub fn is_listed(&self) -> bool {
        self.status == GarmentStatus::Listed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_type_permissions() {
        assert!(ListingType::Sale.permits_sale());
        assert!(!ListingType::Sale.permits_trade());
        assert!(ListingType::Trade.permits_trade());
        assert!(!ListingType::Trade.permits_sale());
        assert!(ListingType::SaleOrTrade.permits_sale());
        assert!(ListingType::SaleOrTrade.permits_trade());
    }

    #[test]
    fn test_new_garment_is_listed() {
        let garment = Garment::new(
            UserId::new(),
            "Vintage wool coat",
            ListingType::Sale,
            Some(Money::from_cents(10_000)),
        );
        assert!(garment.is_listed());
        assert_eq!(garment.status, GarmentStatus::Listed);
    }

    #[test]
    fn test_non_listed_garment_is_unavailable() {
        let mut garment = Garment::new(UserId::new(), "Silk scarf", ListingType::Trade, None);
        garment.status = GarmentStatus::Reserved;
        assert!(!garment.is_listed());
        garment.status = GarmentStatus::Sold;
        assert!(!garment.is_listed());
        garment.status = GarmentStatus::Hidden;
        assert!(!garment.is_listed());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let garment = Garment::new(
            UserId::new(),
            "Linen shirt",
            ListingType::SaleOrTrade,
            Some(Money::from_cents(4500)),
        );
        let json = serde_json::to_string(&garment).unwrap();
        let deserialized: Garment = serde_json::from_str(&json).unwrap();
        assert_eq!(garment, deserialized);
    }
}
