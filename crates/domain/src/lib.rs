//! Domain layer for the exchange lifecycle engine.
//!
//! This crate provides the core entity model including:
//! - Exchange aggregate with its stage and status state machines
//! - Offer and the append-only negotiation log
//! - Side-attachments (messages, tracking, reviews, disputes, addresses)
//! - Garment listing entity
//! - Pure next-action resolver

pub mod exchange;
pub mod garment;

pub use exchange::{
    Address, COUNTER_OFFER_REASON, Currency, Dispute, DisputeReason, Exchange, ExchangeError,
    ExchangeKind, ExchangeMessage, ExchangeStage, ExchangeStatus, GarmentId, Money, NextAction,
    NextActionType, Offer, OfferId, OfferStatus, Review, TrackingInfo, UserId,
};
pub use garment::{Garment, GarmentStatus, ListingType};
