//! Exchange repository trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ExchangeId;
use domain::{
    Address, Dispute, Exchange, ExchangeError, ExchangeMessage, ExchangeStage, GarmentId, Offer,
    OfferId, Review, TrackingInfo,
};
use tokio::sync::RwLock;

use crate::error::{RepositoryError, Result};

/// Persistence contract for exchange aggregates.
///
/// Every mutation returns the updated exchange. Implementations must make
/// `create` an atomic check-and-write against the one-active-exchange-
/// per-garment invariant, and must reject out-of-order stage writes.
#[async_trait]
pub trait ExchangeRepository: Send + Sync {
    /// Persists a new exchange.
    ///
    /// Fails with [`RepositoryError::ActiveExchangeExists`] if the garment
    /// already has a non-terminal exchange.
    async fn create(&self, exchange: Exchange) -> Result<Exchange>;

    /// Retrieves an exchange by ID.
    ///
    /// Returns None if no such exchange exists.
    async fn get(&self, id: ExchangeId) -> Result<Option<Exchange>>;

    /// Returns true if the garment has a non-terminal exchange.
    async fn has_active_exchange(&self, garment_id: GarmentId) -> Result<bool>;

    /// Appends an offer to the negotiation log.
    async fn add_offer(&self, id: ExchangeId, offer: Offer) -> Result<Exchange>;

    /// Accepts an open offer, promoting its terms onto the exchange.
    async fn accept_offer(&self, id: ExchangeId, offer_id: OfferId) -> Result<Exchange>;

    /// Declines an open offer, recording the reason.
    async fn decline_offer(
        &self,
        id: ExchangeId,
        offer_id: OfferId,
        reason: Option<String>,
    ) -> Result<Exchange>;

    /// Appends a message to the communication log.
    async fn add_message(&self, id: ExchangeId, message: ExchangeMessage) -> Result<Exchange>;

    /// Accepts the exchange at its current terms.
    async fn accept(&self, id: ExchangeId) -> Result<Exchange>;

    /// Declines the exchange.
    async fn decline(&self, id: ExchangeId, reason: Option<String>) -> Result<Exchange>;

    /// Cancels the exchange.
    async fn cancel(&self, id: ExchangeId, reason: Option<String>) -> Result<Exchange>;

    /// Advances the lifecycle stage; out-of-order writes are rejected.
    async fn update_stage(&self, id: ExchangeId, stage: ExchangeStage) -> Result<Exchange>;

    /// Attaches carrier tracking info.
    async fn add_tracking(&self, id: ExchangeId, tracking: TrackingInfo) -> Result<Exchange>;

    /// Adds a party's review.
    async fn add_review(&self, id: ExchangeId, review: Review) -> Result<Exchange>;

    /// Opens a dispute on the exchange.
    async fn open_dispute(&self, id: ExchangeId, dispute: Dispute) -> Result<Exchange>;

    /// Replaces the shipping address.
    async fn update_shipping_address(&self, id: ExchangeId, address: Address) -> Result<Exchange>;
}

/// In-memory exchange repository.
///
/// All invariant checks run under a single write lock, giving the same
/// atomicity a backed implementation gets from its transaction.
#[derive(Clone, Default)]
pub struct InMemoryExchangeRepository {
    exchanges: Arc<RwLock<HashMap<ExchangeId, Exchange>>>,
}

impl InMemoryExchangeRepository {
    /// Creates a new empty in-memory exchange repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of exchanges stored.
    pub async fn exchange_count(&self) -> usize {
        self.exchanges.read().await.len()
    }

    /// Applies a validated mutation to a stored exchange and returns the
    /// updated copy.
    async fn mutate<F>(&self, id: ExchangeId, apply: F) -> Result<Exchange>
    where
        F: FnOnce(&mut Exchange) -> std::result::Result<(), ExchangeError>,
    {
        let mut exchanges = self.exchanges.write().await;
        let exchange = exchanges
            .get_mut(&id)
            .ok_or(RepositoryError::ExchangeNotFound(id))?;
        apply(exchange)?;
        Ok(exchange.clone())
    }
}

#[async_trait]
impl ExchangeRepository for InMemoryExchangeRepository {
    async fn create(&self, exchange: Exchange) -> Result<Exchange> {
        let mut exchanges = self.exchanges.write().await;

        // Check-and-write under the same lock.
        let garment_id = exchange.garment_id();
        if exchanges
            .values()
            .any(|e| e.garment_id() == garment_id && !e.is_terminal())
        {
            return Err(RepositoryError::ActiveExchangeExists(garment_id));
        }

        exchanges.insert(exchange.id(), exchange.clone());
        Ok(exchange)
    }

    async fn get(&self, id: ExchangeId) -> Result<Option<Exchange>> {
        Ok(self.exchanges.read().await.get(&id).cloned())
    }

    async fn has_active_exchange(&self, garment_id: GarmentId) -> Result<bool> {
        let exchanges = self.exchanges.read().await;
        Ok(exchanges
            .values()
            .any(|e| e.garment_id() == garment_id && !e.is_terminal()))
    }

    async fn add_offer(&self, id: ExchangeId, offer: Offer) -> Result<Exchange> {
        self.mutate(id, |e| e.add_offer(offer)).await
    }

    async fn accept_offer(&self, id: ExchangeId, offer_id: OfferId) -> Result<Exchange> {
        self.mutate(id, |e| e.accept_offer(offer_id)).await
    }

    async fn decline_offer(
        &self,
        id: ExchangeId,
        offer_id: OfferId,
        reason: Option<String>,
    ) -> Result<Exchange> {
        self.mutate(id, |e| e.decline_offer(offer_id, reason)).await
    }

    async fn add_message(&self, id: ExchangeId, message: ExchangeMessage) -> Result<Exchange> {
        self.mutate(id, |e| e.add_message(message)).await
    }

    async fn accept(&self, id: ExchangeId) -> Result<Exchange> {
        self.mutate(id, |e| e.accept()).await
    }

    async fn decline(&self, id: ExchangeId, reason: Option<String>) -> Result<Exchange> {
        self.mutate(id, |e| e.decline(reason)).await
    }

    async fn cancel(&self, id: ExchangeId, reason: Option<String>) -> Result<Exchange> {
        self.mutate(id, |e| e.cancel(reason)).await
    }

    async fn update_stage(&self, id: ExchangeId, stage: ExchangeStage) -> Result<Exchange> {
        self.mutate(id, |e| e.advance_stage(stage)).await
    }

    async fn add_tracking(&self, id: ExchangeId, tracking: TrackingInfo) -> Result<Exchange> {
        self.mutate(id, |e| e.attach_tracking(tracking)).await
    }

    async fn add_review(&self, id: ExchangeId, review: Review) -> Result<Exchange> {
        self.mutate(id, |e| e.add_review(review)).await
    }

    async fn open_dispute(&self, id: ExchangeId, dispute: Dispute) -> Result<Exchange> {
        self.mutate(id, |e| e.open_dispute(dispute)).await
    }

    async fn update_shipping_address(&self, id: ExchangeId, address: Address) -> Result<Exchange> {
        self.mutate(id, |e| e.update_shipping_address(address)).await
    }
}
